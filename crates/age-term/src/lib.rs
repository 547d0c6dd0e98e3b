pub mod input;
pub mod runner;
pub mod sound;
pub mod view;

pub use input::{map_key, KeySource, RawTerminal, ScriptedKeys, TerminalKeys};
pub use runner::{GameRunner, RunOutcome, RunSummary};
pub use sound::TerminalBell;
pub use view::AsciiView;
