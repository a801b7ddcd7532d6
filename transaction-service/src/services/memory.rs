//! In-memory `TransactionStore` for tests and local runs without MongoDB.

use crate::models::{Product, Transaction};
use crate::services::repository::TransactionStore;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryTransactionStore {
    products: RwLock<HashMap<Uuid, Product>>,
    transactions: RwLock<HashMap<String, Transaction>>,
    fail_writes: AtomicBool,
    updates: AtomicUsize,
}

impl InMemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        Self {
            products: RwLock::new(products.into_iter().map(|p| (p.id, p)).collect()),
            ..Self::default()
        }
    }

    /// Make every subsequent create/update fail.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful `update_transaction` calls.
    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub async fn transactions(&self) -> Vec<Transaction> {
        self.transactions.read().await.values().cloned().collect()
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            anyhow::bail!("store is read-only");
        }
        Ok(())
    }
}

#[async_trait]
impl TransactionStore for InMemoryTransactionStore {
    async fn get_product_by_id(&self, id: Uuid) -> Result<Option<Product>> {
        Ok(self.products.read().await.get(&id).cloned())
    }

    async fn get_transaction_by_reference(&self, reference: &str) -> Result<Option<Transaction>> {
        Ok(self.transactions.read().await.get(reference).cloned())
    }

    async fn create_transaction(&self, transaction: Transaction) -> Result<Transaction> {
        self.check_writable()?;

        let mut transactions = self.transactions.write().await;
        if transactions.contains_key(&transaction.reference) {
            anyhow::bail!("duplicate reference {}", transaction.reference);
        }
        transactions.insert(transaction.reference.clone(), transaction.clone());
        Ok(transaction)
    }

    async fn update_transaction(&self, transaction: &Transaction) -> Result<()> {
        self.check_writable()?;

        let mut transactions = self.transactions.write().await;
        let stored = transactions
            .get_mut(&transaction.reference)
            .ok_or_else(|| anyhow::anyhow!("no transaction with reference {}", transaction.reference))?;

        stored.status = transaction.status;
        stored.amount_paid = transaction.amount_paid;
        stored.updated_at = transaction.updated_at;
        self.updates.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
