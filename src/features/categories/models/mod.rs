mod category_variant;

pub use category_variant::CategoryVariant;
