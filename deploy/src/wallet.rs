use std::path::Path;

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use ethers::signers::LocalWallet;
use ethers::types::H256;
use sha3::{Digest, Sha3_256};

use crate::address::Address;

/// Signing identity decrypted from a keystore file.
///
/// The address is the last 20 bytes of the SHA3-256 digest of the uncompressed
/// public key (without the 0x04 tag byte).
pub struct KeyWallet {
    signer: LocalWallet,
    address: Address,
}

impl KeyWallet {
    pub fn load(path: &Path, password: &str) -> Result<Self> {
        let signer = LocalWallet::decrypt_keystore(path, password)
            .with_context(|| format!("decrypting keystore {}", path.display()))?;
        Ok(Self::from_signer(signer))
    }

    #[cfg(test)]
    pub fn from_private_key(sk: &[u8]) -> Result<Self> {
        Ok(Self::from_signer(LocalWallet::from_bytes(sk)?))
    }

    fn from_signer(signer: LocalWallet) -> Self {
        let point = signer.signer().verifying_key().to_encoded_point(false);
        let digest = Sha3_256::digest(&point.as_bytes()[1..]);
        let mut body = [0u8; 20];
        body.copy_from_slice(&digest[12..]);

        KeyWallet {
            signer,
            address: Address::eoa(body),
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Recoverable signature over a 32-byte digest: base64 of the 65-byte
    /// r, s, recovery-id concatenation.
    pub fn sign(&self, digest: [u8; 32]) -> Result<String> {
        let signature = self.signer.sign_hash(H256::from(digest))?;
        let mut raw = [0u8; 65];
        signature.r.to_big_endian(&mut raw[..32]);
        signature.s.to_big_endian(&mut raw[32..64]);
        raw[64] = signature.recovery_id()?.to_byte();
        Ok(STANDARD.encode(raw))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use base64::Engine as _;

    use super::*;

    #[test]
    fn address_derivation_is_deterministic() {
        let a = KeyWallet::from_private_key(&[0x11; 32]).unwrap();
        let b = KeyWallet::from_private_key(&[0x11; 32]).unwrap();
        assert_eq!(a.address(), b.address());
        assert!(a.address().as_str().starts_with("hx"));
        assert!(Address::from_str(a.address().as_str()).is_ok());
    }

    #[test]
    fn signature_is_65_bytes_base64() {
        let wallet = KeyWallet::from_private_key(&[0x11; 32]).unwrap();
        let sig = wallet.sign([0x42; 32]).unwrap();
        let raw = STANDARD.decode(sig).unwrap();
        assert_eq!(raw.len(), 65);
        assert!(raw[64] < 4);
    }
}
