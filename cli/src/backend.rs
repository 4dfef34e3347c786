//! Sequencer backend selection: opens the handle for one command.

use seqconnect_core::command::Command;
use seqconnect_core::response::Response;
use seqconnect_core::types::Settings;
use seqconnect_core::Result;


/// Open the ALSA sequencer, build the graph, and execute `cmd`.
/// The handle is closed when `sys` goes out of scope.
#[cfg(feature = "alsa")]
pub fn run(cmd: Command, settings: Settings) -> Result<Response> {
    use seqconnect_core::sequencer::AlsaSequencer;
    use seqconnect_core::sys::Sys;

    let seq = AlsaSequencer::open(&settings)?;
    let mut sys = Sys::new(seq, settings);
    Ok(sys.execute(cmd))
}


#[cfg(not(feature = "alsa"))]
pub fn run(_cmd: Command, _settings: Settings) -> Result<Response> {
    Err(seqconnect_core::RouteError::SequencerUnavailable(
        "built without ALSA support (rebuild with --features alsa)".into(),
    ))
}
