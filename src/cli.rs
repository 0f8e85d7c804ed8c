//! Argument parsing for the bundled demonstration binary. Not part of the
//! library's public surface — the HTTP layer a real deployment sits behind
//! is out of scope (§1); this is only a way to exercise the engine from a
//! terminal.

use clap::Parser as ClapParser;

#[derive(ClapParser, Debug)]
#[command(author, version, about = "Hybrid BM25 + dense-vector catalog search demo", long_about = None)]
pub struct Args {
    /// Search query text
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Number of results to return
    #[arg(short = 'k', long = "top-k", default_value_t = 5)]
    pub top_k: usize,

    /// Minimum combined score a result must clear
    #[arg(long = "min-score", default_value_t = 0.0)]
    pub min_score: f64,

    /// Weight applied to the normalized semantic score
    #[arg(long = "w-sem", default_value_t = 0.6)]
    pub w_sem: f64,

    /// Weight applied to the normalized keyword score
    #[arg(long = "w-kw", default_value_t = 0.4)]
    pub w_kw: f64,
}
