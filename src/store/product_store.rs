use dashmap::DashMap;
use uuid::Uuid;

use crate::models::product::Product;

pub struct ProductStore {
    products: DashMap<Uuid, Product>,
}

impl ProductStore {
    pub fn new() -> Self {
        Self {
            products: DashMap::new(),
        }
    }

    pub fn insert(&self, product: Product) {
        self.products.insert(product.id, product);
    }

    pub fn find_by_seller(&self, seller_id: &str) -> Vec<Product> {
        self.products
            .iter()
            .filter(|entry| entry.seller_id == seller_id)
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
