//! Deriving type names and caller keys

use std::collections::HashMap;
use strata_cache::KeyNamer;
use strata_cache::prelude::*;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, TypeName)]
struct Invoice {
    id: u64,
    total_cents: i64,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, TypeName)]
#[type_name(rename = "PagedResult")]
struct Page<T> {
    items: Vec<T>,
    cursor: Option<String>,
}

#[derive(CacheKey)]
struct InvoiceQuery {
    customer: String,
    year: u16,
}

fn main() {
    let namer = KeyNamer::new(Some("billing"));
    let query = InvoiceQuery {
        customer: "acme".to_string(),
        year: 2024,
    };

    println!("{}", namer.name::<Invoice>(&query.cache_key()));
    println!("{}", namer.name::<Page<Invoice>>("recent"));
    println!("{}", namer.name::<HashMap<String, Vec<Invoice>>>("by_customer"));
}
