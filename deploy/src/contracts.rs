use std::collections::HashMap;

pub const JAVA_CONTENT_TYPE: &str = "application/java";
pub const ZIP_CONTENT_TYPE: &str = "application/zip";

/// Registry of contracts that ship as pre-built optimized jars, keyed by
/// contract name with the version baked into the artifact file name.
#[derive(Debug, Clone)]
pub struct JavaContracts(HashMap<String, String>);

impl Default for JavaContracts {
    fn default() -> Self {
        Self::new([("app", "0.1.0")])
    }
}

impl JavaContracts {
    pub fn new<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        JavaContracts(
            entries
                .into_iter()
                .map(|(name, version)| (name.to_string(), version.to_string()))
                .collect(),
        )
    }

    /// Path of the optimized jar for `name`, or `None` when the name is not a
    /// registered Java contract.
    pub fn jar_path(&self, name: &str) -> Option<String> {
        self.0
            .get(name)
            .map(|version| format!("./{name}/build/libs/{name}-{version}-optimized.jar"))
    }
}
