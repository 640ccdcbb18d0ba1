/// Progress output seam for the deploy workflow.
pub trait Reporter {
    fn report(&self, line: &str);

    /// Whether progress output is enabled at all. Forwarded to the transaction
    /// handler so it can announce result polling.
    fn enabled(&self) -> bool;
}

pub struct Console;

impl Reporter for Console {
    fn report(&self, line: &str) {
        println!("{line}");
    }

    fn enabled(&self) -> bool {
        true
    }
}

pub struct Silent;

impl Reporter for Silent {
    fn report(&self, _line: &str) {}

    fn enabled(&self) -> bool {
        false
    }
}
