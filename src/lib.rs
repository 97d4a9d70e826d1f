//! # Lens Equiv
//!
//! An equivalence calculator for photographers working across sensor and film
//! formats. Given a lens on one format (say a 50mm f/1.4 on full frame), it
//! answers: what gives the same picture on another format? Same field of
//! view, same depth of field, same background blur, or, when one value on the
//! target is fixed, the best match for the other.
//!
//! # Architecture: One Stateless Pass
//!
//! ```text
//! config.toml ─┐
//! CLI flags ───┼─▶ SessionConfig ──▶ EquivalenceInput ──▶ calculate_equivalence ──▶ EquivalenceResult
//! share string ┘        │                   ▲                                            │
//!                       └──▶ FormatCatalog ─┘                           output / --json ◀┘
//! ```
//!
//! The engine ([`calculate`] on top of [`optics`]) is a pure function of its
//! inputs: no I/O, no global state, no caching. Every front end (the CLI
//! commands, the share-string decoder, the parallel `table` command) builds an
//! [`calculate::EquivalenceInput`] and calls the same entry point.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`optics`] | Formula layer: format geometry, angle of view, depth of field, blur, equivalence solves |
//! | [`calculate`] | Orchestration: format lookup, target resolution, per-side results |
//! | [`types`] | Session inputs shared by every layer (`SourceState`, `TargetState`, `Options`) |
//! | [`catalog`] | Built-in format presets by category, merged with custom formats |
//! | [`config`] | `config.toml` loading, merging over stock defaults, validation |
//! | [`share`] | Compact query-string encoding of a whole session |
//! | [`display`] | Number formatting policy: decimals, unit switching, infinity |
//! | [`output`] | CLI output formatting for every command |
//! | [`units`] | Millimetre/inch and degree/radian conversions |
//!
//! # Design Decisions
//!
//! ## Millimetres Everywhere
//!
//! Every length the engine sees or returns is in millimetres: focal lengths,
//! format dimensions, subject distance, DOF limits, blur discs. Inches exist
//! only in [`display`], selected by [`types::Options::display_unit`], which
//! the engine never reads.
//!
//! ## One Formula Set
//!
//! Background blur uses the far-background approximation `f²/(N·s)`, and the
//! target's subject distance is rescaled by `f_t/f_s` so both sides frame the
//! subject the same. The closed-form solves in [`optics::equivalence`] are
//! derived from exactly these formulas, so a "matched" result round-trips
//! through the per-side calculations. An exact blur variant is provided for
//! callers who want it but is not wired into the result.
//!
//! ## Overrides as a Sum Type
//!
//! The target side can pin its focal length or its aperture, never both.
//! [`types::TargetOverride`] makes the invalid state unrepresentable. Where
//! two nullable fields come in from outside (a config file, a share string),
//! they are collapsed at that boundary.
//!
//! ## Focus Results Travel Together
//!
//! Depth of field and blur both need a subject distance. Rather than four
//! independent optional fields, a side carries one optional
//! [`calculate::FocusResult`]: all present or all absent.

pub mod calculate;
pub mod catalog;
pub mod config;
pub mod display;
pub mod optics;
pub mod output;
pub mod share;
pub mod types;
pub mod units;

#[cfg(test)]
pub(crate) mod test_helpers;
