//! Sale Service - order placement, stock checks and delivery tracking

use domain_products::{Product, ProductResponse};
use domain_users::{User, UserResponse};
use listing::{Condition, Filter, ListQuery, Page, SharedAccessor, list, list_scoped};
use std::collections::HashMap;
use std::str::FromStr;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{SaleError, SaleResult};
use crate::models::{
    CreateSale, DeliveryStatus, SALE_FIELDS, Sale, SaleResponse, UpdateDeliveryStatus, UpdateSale,
};

const INVALID_STATUS: &str =
    "Incorrect Delivery Status. Delivery status should be Placed, Packed, Shipped, or Delivered";

/// Sales plus read access to the products and users they reference.
#[derive(Clone)]
pub struct SaleService {
    sales: SharedAccessor<Sale>,
    products: SharedAccessor<Product>,
    users: SharedAccessor<User>,
}

impl SaleService {
    pub fn new(
        sales: SharedAccessor<Sale>,
        products: SharedAccessor<Product>,
        users: SharedAccessor<User>,
    ) -> Self {
        Self {
            sales,
            products,
            users,
        }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, query: &ListQuery) -> SaleResult<Page<SaleResponse>> {
        let page = list::<Sale, Sale, _>(self.sales.as_ref(), &SALE_FIELDS, query).await?;
        self.populate_page(page).await
    }

    /// Sales of one user. A search on `user_id` only narrows within that user.
    #[instrument(skip(self))]
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        query: &ListQuery,
    ) -> SaleResult<Page<SaleResponse>> {
        let scope = Filter::from(Condition::equals("user_id", user_id.to_string()));
        let page = list_scoped::<Sale, Sale, _>(self.sales.as_ref(), &SALE_FIELDS, query, scope)
            .await?;
        self.populate_page(page).await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> SaleResult<SaleResponse> {
        let sale = self.find(id).await?;
        self.populate(sale).await
    }

    /// Place an order and take its quantity out of stock.
    ///
    /// Stock is decremented before the sale is stored and put back if the
    /// insert fails; a failed restore is logged. The stock read and the
    /// decrement are separate writes, so two orders racing for the last
    /// units can both pass the check.
    #[instrument(skip(self, input), fields(product_id = %input.product_id, user_id = %input.user_id))]
    pub async fn create(&self, input: CreateSale) -> SaleResult<SaleResponse> {
        input.validate()?;
        let mut product = self.product(input.product_id).await?;
        let user = self.user(input.user_id).await?;

        if product.stock < input.quantity {
            return Err(SaleError::Unprocessable(format!(
                "Not enough stock ({} remaining)",
                product.stock
            )));
        }

        let sale = Sale::place(input);
        let stock_before = product.stock;
        product.set_stock(stock_before - sale.quantity);
        self.products.update_by_id(product.id, product.clone()).await?;

        if let Err(err) = self.sales.insert(sale.clone()).await {
            let mut restored = product.clone();
            restored.set_stock(stock_before);
            if let Err(restore_err) = self.products.update_by_id(restored.id, restored).await {
                tracing::warn!(
                    product_id = %product.id,
                    error = %restore_err,
                    "Failed to restore stock after sale insert failed"
                );
            }
            return Err(err.into());
        }
        tracing::info!(sale_id = %sale.id, remaining = product.stock, "Sale placed");

        Ok(SaleResponse::new(sale, Some(product.into()), Some(user.into())))
    }

    #[instrument(skip(self, input))]
    pub async fn update(&self, id: Uuid, input: UpdateSale) -> SaleResult<SaleResponse> {
        input.validate()?;
        let mut sale = self.find(id).await?;
        let product = self.product(input.product_id).await?;
        let user = self.user(input.user_id).await?;

        sale.apply_update(input);
        let sale = self.replace(sale).await?;
        Ok(SaleResponse::new(sale, Some(product.into()), Some(user.into())))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> SaleResult<()> {
        if !self.sales.delete_by_id(id).await? {
            return Err(SaleError::NotFound(id));
        }
        tracing::info!(sale_id = %id, "Sale deleted");
        Ok(())
    }

    #[instrument(skip(self, input))]
    pub async fn update_delivery_status(
        &self,
        id: Uuid,
        input: UpdateDeliveryStatus,
    ) -> SaleResult<SaleResponse> {
        input.validate()?;
        let mut sale = self.find(id).await?;
        let status = DeliveryStatus::from_str(&input.delivery_status)
            .map_err(|_| SaleError::Unprocessable(INVALID_STATUS.to_string()))?;

        sale.delivery_status = status;
        let sale = self.replace(sale).await?;
        self.populate(sale).await
    }

    async fn find(&self, id: Uuid) -> SaleResult<Sale> {
        self.sales
            .find_by_id(id)
            .await?
            .ok_or(SaleError::NotFound(id))
    }

    async fn replace(&self, sale: Sale) -> SaleResult<Sale> {
        let id = sale.id;
        if !self.sales.update_by_id(id, sale.clone()).await? {
            return Err(SaleError::NotFound(id));
        }
        Ok(sale)
    }

    async fn product(&self, id: Uuid) -> SaleResult<Product> {
        self.products
            .find_by_id(id)
            .await?
            .ok_or_else(|| SaleError::Unprocessable("Unknown product".to_string()))
    }

    async fn user(&self, id: Uuid) -> SaleResult<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| SaleError::Unprocessable("Unknown user".to_string()))
    }

    async fn populate(&self, sale: Sale) -> SaleResult<SaleResponse> {
        let product = self.products.find_by_id(sale.product_id).await?;
        let user = self.users.find_by_id(sale.user_id).await?;
        Ok(SaleResponse::new(
            sale,
            product.map(ProductResponse::from),
            user.map(UserResponse::from),
        ))
    }

    /// Resolve references for a page, looking each product and user up once.
    async fn populate_page(&self, mut page: Page<Sale>) -> SaleResult<Page<SaleResponse>> {
        let sales = std::mem::take(&mut page.data);
        let mut products: HashMap<Uuid, Option<ProductResponse>> = HashMap::new();
        let mut users: HashMap<Uuid, Option<UserResponse>> = HashMap::new();
        let mut data = Vec::with_capacity(sales.len());

        for sale in sales {
            if !products.contains_key(&sale.product_id) {
                let product = self.products.find_by_id(sale.product_id).await?;
                products.insert(sale.product_id, product.map(ProductResponse::from));
            }
            if !users.contains_key(&sale.user_id) {
                let user = self.users.find_by_id(sale.user_id).await?;
                users.insert(sale.user_id, user.map(UserResponse::from));
            }

            let product = products.get(&sale.product_id).cloned().flatten();
            let user = users.get(&sale.user_id).cloned().flatten();
            data.push(SaleResponse::new(sale, product, user));
        }

        Ok(page.with_data(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use domain_products::CreateProduct;
    use listing::{EntityAccessor, InMemoryAccessor, ListingError, ListingResult, Window};
    use std::sync::Arc;

    /// Sales store that refuses every write.
    struct ReadOnlySales;

    #[async_trait]
    impl EntityAccessor<Sale> for ReadOnlySales {
        async fn count(&self, _filter: &Filter) -> ListingResult<u64> {
            Ok(0)
        }

        async fn find(
            &self,
            _filter: &Filter,
            _order: Option<&listing::SortOrder>,
            _window: Window,
        ) -> ListingResult<Vec<Sale>> {
            Ok(Vec::new())
        }

        async fn find_by_id(&self, _id: Uuid) -> ListingResult<Option<Sale>> {
            Ok(None)
        }

        async fn insert(&self, _record: Sale) -> ListingResult<Uuid> {
            Err(ListingError::DataAccess("write refused".into()))
        }

        async fn update_by_id(&self, _id: Uuid, _record: Sale) -> ListingResult<bool> {
            Err(ListingError::DataAccess("write refused".into()))
        }

        async fn delete_by_id(&self, _id: Uuid) -> ListingResult<bool> {
            Err(ListingError::DataAccess("write refused".into()))
        }
    }

    struct Fixture {
        service: SaleService,
        products: Arc<InMemoryAccessor<Product>>,
        product: Product,
        user: User,
    }

    async fn fixture(stock: i64) -> Fixture {
        fixture_with(stock, Arc::new(InMemoryAccessor::<Sale>::new())).await
    }

    async fn fixture_with(stock: i64, sales: SharedAccessor<Sale>) -> Fixture {
        let products = Arc::new(InMemoryAccessor::<Product>::new());
        let users = Arc::new(InMemoryAccessor::<User>::new());

        let product = Product::new(CreateProduct {
            name: "Basic Tee".to_string(),
            price: 1999,
            description: "Cotton".to_string(),
            category: "Unisex".to_string(),
            stock,
        });
        products.insert(product.clone()).await.unwrap();
        let user = User::new(
            "Ada".to_string(),
            "ada@example.com".to_string(),
            "$argon2id$hash".to_string(),
        );
        users.insert(user.clone()).await.unwrap();

        let service = SaleService::new(sales, products.clone(), users);
        Fixture {
            service,
            products,
            product,
            user,
        }
    }

    fn order(f: &Fixture, quantity: i64) -> CreateSale {
        CreateSale {
            product_id: f.product.id,
            user_id: f.user.id,
            quantity,
            address: "1 Analytical Way".to_string(),
        }
    }

    async fn stock(f: &Fixture) -> i64 {
        f.products
            .find_by_id(f.product.id)
            .await
            .unwrap()
            .unwrap()
            .stock
    }

    #[tokio::test]
    async fn test_create_decrements_stock() {
        let f = fixture(10).await;

        let sale = f.service.create(order(&f, 3)).await.unwrap();

        assert_eq!(sale.delivery_status, DeliveryStatus::Placed);
        assert_eq!(stock(&f).await, 7);
    }

    #[tokio::test]
    async fn test_create_with_insufficient_stock() {
        let f = fixture(2).await;

        let err = f.service.create(order(&f, 3)).await.unwrap_err();

        assert!(matches!(err, SaleError::Unprocessable(msg) if msg == "Not enough stock (2 remaining)"));
        assert_eq!(stock(&f).await, 2);
    }

    #[tokio::test]
    async fn test_create_can_take_the_last_unit() {
        let f = fixture(3).await;
        f.service.create(order(&f, 3)).await.unwrap();
        assert_eq!(stock(&f).await, 0);
    }

    #[tokio::test]
    async fn test_create_with_unknown_references() {
        let f = fixture(10).await;

        let mut input = order(&f, 1);
        input.product_id = Uuid::now_v7();
        let err = f.service.create(input).await.unwrap_err();
        assert!(matches!(err, SaleError::Unprocessable(msg) if msg == "Unknown product"));

        let mut input = order(&f, 1);
        input.user_id = Uuid::now_v7();
        let err = f.service.create(input).await.unwrap_err();
        assert!(matches!(err, SaleError::Unprocessable(msg) if msg == "Unknown user"));
    }

    #[tokio::test]
    async fn test_update_delivery_status() {
        let f = fixture(10).await;
        let sale = f.service.create(order(&f, 1)).await.unwrap();

        let updated = f
            .service
            .update_delivery_status(
                sale.id,
                UpdateDeliveryStatus {
                    delivery_status: "Shipped".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.delivery_status, DeliveryStatus::Shipped);

        let err = f
            .service
            .update_delivery_status(
                sale.id,
                UpdateDeliveryStatus {
                    delivery_status: "Lost".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SaleError::Unprocessable(msg) if msg == INVALID_STATUS));
    }

    #[tokio::test]
    async fn test_update_keeps_stock_untouched() {
        let f = fixture(10).await;
        let sale = f.service.create(order(&f, 1)).await.unwrap();

        let updated = f.service.update(sale.id, order(&f, 5)).await.unwrap();

        assert_eq!(updated.quantity, 5);
        assert_eq!(updated.date, sale.date);
        assert_eq!(stock(&f).await, 9);
    }

    #[tokio::test]
    async fn test_list_for_user_is_scoped() {
        let f = fixture(10).await;
        f.service.create(order(&f, 1)).await.unwrap();
        f.service.create(order(&f, 2)).await.unwrap();

        let own = f
            .service
            .list_for_user(f.user.id, &ListQuery::default())
            .await
            .unwrap();
        assert_eq!(own.count, 2);

        let stranger = Uuid::now_v7();
        let escape = ListQuery {
            search: Some(format!("user_id:{}", f.user.id)),
            ..Default::default()
        };
        let other = f.service.list_for_user(stranger, &escape).await.unwrap();
        assert_eq!(other.count, 0);
    }

    #[tokio::test]
    async fn test_missing_sale_is_not_found() {
        let f = fixture(10).await;
        let id = Uuid::now_v7();

        assert!(matches!(f.service.get(id).await, Err(SaleError::NotFound(_))));
        assert!(matches!(f.service.delete(id).await, Err(SaleError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_failed_insert_leaves_stock_untouched() {
        let f = fixture_with(10, Arc::new(ReadOnlySales)).await;

        let err = f.service.create(order(&f, 3)).await.unwrap_err();

        assert!(matches!(err, SaleError::Listing(ListingError::DataAccess(_))));
        assert_eq!(stock(&f).await, 10);
    }

    #[tokio::test]
    async fn test_responses_embed_product_and_user() {
        let f = fixture(10).await;
        let created = f.service.create(order(&f, 2)).await.unwrap();
        assert_eq!(created.product.as_ref().unwrap().stock, 8);

        let sale = f.service.get(created.id).await.unwrap();
        let product = sale.product.unwrap();
        assert_eq!(product.id, f.product.id);
        assert_eq!(product.name, "Basic Tee");
        let user = sale.user.unwrap();
        assert_eq!(user.email, "ada@example.com");

        let page = f.service.list(&ListQuery::default()).await.unwrap();
        assert_eq!(page.data[0].user.as_ref().unwrap().id, f.user.id);
        assert_eq!(page.data[0].product.as_ref().unwrap().id, f.product.id);
    }

    #[tokio::test]
    async fn test_deleted_product_resolves_to_none() {
        let f = fixture(10).await;
        let created = f.service.create(order(&f, 1)).await.unwrap();
        f.products.delete_by_id(f.product.id).await.unwrap();

        let sale = f.service.get(created.id).await.unwrap();
        assert!(sale.product.is_none());
        assert_eq!(sale.product_id, f.product.id);
        assert!(sale.user.is_some());
    }
}
