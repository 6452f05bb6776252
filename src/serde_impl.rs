//! `serde` support. Every (de)serializable type derives `Serialize` and
//! `Deserialize` directly at its definition site (`Point`, `Circle`,
//! `OptionIndex`, `Triangulation`) behind the `serde` feature. This crate
//! only depends on `serde` itself, not a concrete data format; pick
//! `serde_json`/`bincode`/etc. in the host application.
