//! One module per subcommand, each exposing `execute`.

pub mod create;
pub mod delete;
pub mod generate;
pub mod retrieve;
pub mod serve;
pub mod update;
