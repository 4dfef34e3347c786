//! Port capability filter for listings (`--input` / `--output`).

use crate::types::Capabilities;


/// Which ports a listing shows. With neither direction set every port passes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PortFilter {
    /// Readable ports that accept read subscriptions.
    pub input: bool,
    /// Writable ports that accept write subscriptions.
    pub output: bool,
}

const INPUT_BITS: Capabilities = Capabilities::from_bits(
    Capabilities::READ.bits() | Capabilities::SUBS_READ.bits(),
);
const OUTPUT_BITS: Capabilities = Capabilities::from_bits(
    Capabilities::WRITE.bits() | Capabilities::SUBS_WRITE.bits(),
);


impl PortFilter {
    pub fn new(input: bool, output: bool) -> Self {
        PortFilter { input, output }
    }

    pub fn is_active(&self) -> bool {
        self.input || self.output
    }

    /// Either requested direction suffices; no-export ports never pass an
    /// active filter.
    pub fn accepts(&self, caps: Capabilities) -> bool {
        if !self.is_active() {
            return true;
        }
        if caps.intersects(Capabilities::NO_EXPORT) {
            return false;
        }
        (self.input && caps.contains(INPUT_BITS)) || (self.output && caps.contains(OUTPUT_BITS))
    }
}
