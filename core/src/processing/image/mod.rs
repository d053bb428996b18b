mod derive;
mod resize;

pub use derive::{derive_variants, try_derive_variants, DerivationSettings, DerivedNames};
pub use resize::{fit_width, render_variant, Size, VariantParams};
