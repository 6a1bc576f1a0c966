//! Startup catalogue seed

use core_config::{ConfigError, FromEnv, env_flag};
use listing::{EntityAccessor, Filter};
use tracing::instrument;

use crate::error::ProductResult;
use crate::models::{CreateProduct, Product};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedConfig {
    pub enabled: bool,
}

impl FromEnv for SeedConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            enabled: env_flag("SEED_DEFAULT_PRODUCTS"),
        })
    }
}

fn product(name: &str, price: i64, description: &str, category: &str, stock: i64) -> CreateProduct {
    CreateProduct {
        name: name.to_string(),
        price,
        description: description.to_string(),
        category: category.to_string(),
        stock,
    }
}

/// The sample catalogue. Prices are in cents.
pub fn sample_products() -> Vec<CreateProduct> {
    vec![
        product("Classic Crew Tee", 1999, "Soft cotton crew neck t-shirt", "Unisex", 120),
        product("Slim Fit Chinos", 4999, "Stretch twill chinos with a tapered leg", "Male", 60),
        product("Oxford Button-Down", 5499, "Washed oxford shirt with a button-down collar", "Male", 45),
        product("Wool Overcoat", 18999, "Single-breasted overcoat in a wool blend", "Male", 15),
        product("Wrap Midi Dress", 6999, "Viscose wrap dress with a tie waist", "Female", 40),
        product("High-Rise Jeans", 5999, "Straight leg denim with a high rise", "Female", 75),
        product("Cashmere Cardigan", 12999, "Lightweight cashmere cardigan", "Female", 20),
        product("Pleated Skirt", 3999, "Satin pleated midi skirt", "Female", 35),
        product("Fleece Hoodie", 3999, "Brushed fleece pullover hoodie", "Unisex", 90),
        product("Canvas Sneakers", 5999, "Low-top canvas sneakers with a rubber sole", "Unisex", 80),
        product("Rain Shell Jacket", 9999, "Packable waterproof shell", "Unisex", 30),
        product("Merino Beanie", 2499, "Ribbed merino wool beanie", "Unisex", 150),
    ]
}

/// Insert [`sample_products`] when the catalogue is empty.
///
/// Returns the number of products inserted, 0 when products already exist.
#[instrument(skip(accessor))]
pub async fn seed_default_products<A>(accessor: &A) -> ProductResult<usize>
where
    A: EntityAccessor<Product> + ?Sized,
{
    let existing = accessor.count(&Filter::all()).await?;
    if existing > 0 {
        tracing::info!(existing, "Catalogue not empty, skipping product seed");
        return Ok(0);
    }

    let samples = sample_products();
    let inserted = samples.len();
    for input in samples {
        accessor.insert(Product::new(input)).await?;
    }

    tracing::info!(inserted, "Seeded default products");
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use listing::InMemoryAccessor;
    use std::collections::HashSet;
    use validator::Validate;

    #[test]
    fn test_seed_config_from_env() {
        temp_env::with_var("SEED_DEFAULT_PRODUCTS", Some("true"), || {
            assert!(SeedConfig::from_env().unwrap().enabled);
        });
        temp_env::with_var_unset("SEED_DEFAULT_PRODUCTS", || {
            assert!(!SeedConfig::from_env().unwrap().enabled);
        });
    }

    #[test]
    fn test_samples_are_valid_and_uniquely_named() {
        let samples = sample_products();
        let names: HashSet<_> = samples.iter().map(|p| p.name.as_str()).collect();

        assert_eq!(names.len(), samples.len());
        assert!(samples.iter().all(|p| p.validate().is_ok()));
    }

    #[tokio::test]
    async fn test_seed_fills_empty_catalogue() {
        let accessor = InMemoryAccessor::<Product>::new();

        let inserted = seed_default_products(&accessor).await.unwrap();

        assert_eq!(inserted, sample_products().len());
        assert_eq!(
            accessor.count(&Filter::all()).await.unwrap(),
            inserted as u64
        );
    }

    #[tokio::test]
    async fn test_seed_skips_non_empty_catalogue() {
        let accessor = InMemoryAccessor::<Product>::new();
        seed_default_products(&accessor).await.unwrap();

        let inserted = seed_default_products(&accessor).await.unwrap();

        assert_eq!(inserted, 0);
        assert_eq!(
            accessor.count(&Filter::all()).await.unwrap(),
            sample_products().len() as u64
        );
    }
}
