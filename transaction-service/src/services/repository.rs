use crate::models::{Product, Transaction};
use anyhow::Result;
use async_trait::async_trait;
use mongodb::options::{IndexOptions, UpdateOptions};
use mongodb::{
    bson::{doc, to_bson},
    Collection, Database, IndexModel,
};
use uuid::Uuid;

/// Persistence seam for products and transactions.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn get_product_by_id(&self, id: Uuid) -> Result<Option<Product>>;

    async fn get_transaction_by_reference(&self, reference: &str) -> Result<Option<Transaction>>;

    async fn create_transaction(&self, transaction: Transaction) -> Result<Transaction>;

    /// Write status and amount paid for the transaction with the same
    /// `reference`, as one atomic update.
    async fn update_transaction(&self, transaction: &Transaction) -> Result<()>;
}

#[derive(Clone)]
pub struct PaymentRepository {
    product_collection: Collection<Product>,
    transaction_collection: Collection<Transaction>,
}

impl PaymentRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            product_collection: db.collection("products"),
            transaction_collection: db.collection("transactions"),
        }
    }

    /// Create the unique index that backs reference lookups.
    pub async fn init_indexes(&self) -> Result<()> {
        let reference_index = IndexModel::builder()
            .keys(doc! { "reference": 1 })
            .options(
                IndexOptions::builder()
                    .name("transaction_reference_idx".to_string())
                    .unique(true)
                    .build(),
            )
            .build();

        self.transaction_collection
            .create_indexes([reference_index], None)
            .await?;

        tracing::info!("Transaction service indexes initialized");
        Ok(())
    }

    /// Upsert catalog entries by id.
    pub async fn seed_products(&self, products: &[Product]) -> Result<()> {
        for product in products {
            let filter = doc! { "_id": to_bson(&product.id)? };
            let update = doc! {
                "$set": {
                    "name": product.name.as_str(),
                    "price": product.price,
                }
            };
            self.product_collection
                .update_one(filter, update, UpdateOptions::builder().upsert(true).build())
                .await?;
        }

        tracing::info!(count = products.len(), "Products seeded");
        Ok(())
    }
}

#[async_trait]
impl TransactionStore for PaymentRepository {
    async fn get_product_by_id(&self, id: Uuid) -> Result<Option<Product>> {
        let filter = doc! { "_id": to_bson(&id)? };
        let product = self.product_collection.find_one(filter, None).await?;
        Ok(product)
    }

    async fn get_transaction_by_reference(&self, reference: &str) -> Result<Option<Transaction>> {
        let filter = doc! { "reference": reference };
        let transaction = self.transaction_collection.find_one(filter, None).await?;
        Ok(transaction)
    }

    async fn create_transaction(&self, transaction: Transaction) -> Result<Transaction> {
        self.transaction_collection
            .insert_one(&transaction, None)
            .await?;
        Ok(transaction)
    }

    async fn update_transaction(&self, transaction: &Transaction) -> Result<()> {
        let filter = doc! { "reference": transaction.reference.as_str() };
        let update = doc! {
            "$set": {
                "status": transaction.status.as_str(),
                "amount_paid": transaction.amount_paid,
                "updated_at": transaction.updated_at,
            }
        };

        let result = self
            .transaction_collection
            .update_one(filter, update, None)
            .await?;

        if result.matched_count == 0 {
            anyhow::bail!("no transaction with reference {}", transaction.reference);
        }

        Ok(())
    }
}
