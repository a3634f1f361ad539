use std::fmt;

use serde::{Deserialize, Serialize};

/// The product family a showroom model stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductCategory {
    Cake,
    Cupcake,
    Cookie,
}

impl ProductCategory {
    pub const ALL: [ProductCategory; 3] = [
        ProductCategory::Cake,
        ProductCategory::Cupcake,
        ProductCategory::Cookie,
    ];
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProductCategory::Cake => "Cake",
            ProductCategory::Cupcake => "Cupcake",
            ProductCategory::Cookie => "Cookie",
        };

        f.write_str(name)
    }
}
