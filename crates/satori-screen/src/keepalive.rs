//! Watchdog seam.

/// Something that resets if not fed in time
///
/// Long blocking steps (network fetches, retry back-off, panel refresh) feed
/// before they start.
pub trait KeepAlive {
    fn feed(&mut self);

    /// Stop supervising; called on orderly shutdown
    fn cleanup(&mut self) {}
}

/// No watchdog
#[derive(Debug, Default, Clone, Copy)]
pub struct Unsupervised;

impl KeepAlive for Unsupervised {
    fn feed(&mut self) {}
}

impl<K: KeepAlive + ?Sized> KeepAlive for &mut K {
    fn feed(&mut self) {
        (**self).feed();
    }

    fn cleanup(&mut self) {
        (**self).cleanup();
    }
}
