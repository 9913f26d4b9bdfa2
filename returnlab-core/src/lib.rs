//! ReturnLab Core — calendar resampling, rolling returns, return
//! distributions, and cache-aware quote acquisition.
//!
//! Pipeline: the acquisition layer (or CSV ingestion) produces sparse
//! per-symbol series; the resampler aligns them onto a dense daily grid;
//! the return engine derives fixed-horizon rolling returns; the
//! distribution transform bins them per symbol for visualization. The
//! transforms are pure; the acquisition layer owns all I/O behind three
//! injected seams (transport, response store, failure sink).

pub mod data;
pub mod domain;
pub mod timeseries;
