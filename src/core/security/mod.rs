// Security module for caller-supplied policy enforcement
//
// This module holds the checks applied to untrusted caller input before it
// is forwarded upstream, such as restricting requested output fields to the
// configured projection allowlist.

pub mod projection;

pub use projection::FieldProjection;
