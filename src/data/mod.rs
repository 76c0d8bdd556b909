/// Data layer: encoding sniffing, core types and loading.
///
/// Architecture:
/// ```text
///   raw .csv bytes
///        │
///        ▼
///   ┌──────────┐
///   │ encoding  │  sniff BOM / UTF-16 / UTF-8 / windows-1252 → text
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse text → typed cells, dedupe headers
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  Vec<Column>, one inferred kind per column
///   └──────────┘
/// ```

pub mod encoding;
pub mod loader;
pub mod model;
