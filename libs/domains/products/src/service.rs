//! Product Service - catalogue rules on top of the entity accessor

use listing::{Condition, Filter, ListQuery, Page, SharedAccessor, exists_other, list};
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ProductError, ProductResult};
use crate::models::{
    CreateProduct, PRODUCT_FIELDS, Product, ProductResponse, UpdateProduct, UpdateStock,
};

#[derive(Clone)]
pub struct ProductService {
    products: SharedAccessor<Product>,
}

impl ProductService {
    pub fn new(products: SharedAccessor<Product>) -> Self {
        Self { products }
    }

    /// The underlying accessor, shared with services that read products
    /// (sales check and decrement stock through it).
    pub fn accessor(&self) -> SharedAccessor<Product> {
        self.products.clone()
    }

    #[instrument(skip(self))]
    pub async fn list(&self, query: &ListQuery) -> ProductResult<Page<ProductResponse>> {
        let page =
            list::<Product, ProductResponse, _>(self.products.as_ref(), &PRODUCT_FIELDS, query)
                .await?;
        Ok(page)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> ProductResult<ProductResponse> {
        self.find(id).await.map(ProductResponse::from)
    }

    #[instrument(skip(self, input), fields(product_name = %input.name))]
    pub async fn create(&self, input: CreateProduct) -> ProductResult<ProductResponse> {
        input.validate()?;
        self.ensure_name_free(&input.name, None).await?;

        let product = Product::new(input);
        self.products.insert(product.clone()).await?;
        tracing::info!(product_id = %product.id, "Product created");

        Ok(product.into())
    }

    #[instrument(skip(self, input))]
    pub async fn update(&self, id: Uuid, input: UpdateProduct) -> ProductResult<ProductResponse> {
        input.validate()?;
        let mut product = self.find(id).await?;
        self.ensure_name_free(&input.name, Some(id)).await?;

        product.apply_update(input);
        self.replace(product).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> ProductResult<()> {
        if !self.products.delete_by_id(id).await? {
            return Err(ProductError::NotFound(id));
        }
        tracing::info!(product_id = %id, "Product deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn update_stock(&self, id: Uuid, input: UpdateStock) -> ProductResult<ProductResponse> {
        input.validate()?;
        let mut product = self.find(id).await?;

        product.set_stock(input.stock);
        self.replace(product).await
    }

    async fn find(&self, id: Uuid) -> ProductResult<Product> {
        self.products
            .find_by_id(id)
            .await?
            .ok_or(ProductError::NotFound(id))
    }

    async fn replace(&self, product: Product) -> ProductResult<ProductResponse> {
        let id = product.id;
        if !self.products.update_by_id(id, product.clone()).await? {
            // Deleted between the read and the write
            return Err(ProductError::NotFound(id));
        }
        Ok(product.into())
    }

    async fn ensure_name_free(&self, name: &str, except: Option<Uuid>) -> ProductResult<()> {
        let by_name = Filter::from(Condition::equals("name", name));
        if exists_other::<Product, _>(self.products.as_ref(), &by_name, except).await? {
            return Err(ProductError::DuplicateName(name.to_string()));
        }
        Ok(())
    }
}
