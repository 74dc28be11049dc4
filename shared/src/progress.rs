//! The progress/logging sink named in spec §1 as an external collaborator:
//! the core only depends on this trait, never on stdout directly.

pub trait ProgressSink: Send + Sync {
    fn line(&self, message: &str);
}

pub struct Silent;

impl ProgressSink for Silent {
    fn line(&self, _message: &str) {}
}

pub struct Stdout;

impl ProgressSink for Stdout {
    fn line(&self, message: &str) {
        println!("{message}");
    }
}
