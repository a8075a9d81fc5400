//! Benchmarks for exchange normalization, registry merges and emission.

use apispec::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::json;
use std::sync::Arc;

fn cart_contract() -> Arc<ContractModel> {
    Arc::new(
        ContractConfig::new()
            .with_description("Get a cart by id")
            .with_path_parameters([ParameterDescriptor::path("id").with_description("the cart id")])
            .with_response_fields([
                FieldDescriptor::field("total").with_description("Total amount of the cart."),
                FieldDescriptor::field("products[].quantity").with_description("Quantity."),
                FieldDescriptor::subsection("products[].product").with_description("Product."),
                FieldDescriptor::subsection("_links").with_description("Links section."),
            ])
            .with_links([LinkDescriptor::rel("order").with_description("Link to order the cart.")])
            .build()
            .expect("valid contract"),
    )
}

fn cart_example(i: usize) -> Example {
    let products: Vec<_> = (0..20)
        .map(|n| json!({"quantity": n, "product": {"name": format!("product-{n}"), "price": 9.99}}))
        .collect();
    let body = json!({
        "total": 199.8,
        "products": products,
        "_links": {"order": {"href": format!("http://localhost/carts/{i}/order")}}
    });
    Example::new(
        HttpRequest::new(format!("/carts/{i}")),
        HttpResponse::new(200).with_body(body.to_string(), "application/hal+json"),
    )
}

fn recorder_benchmark(c: &mut Criterion) {
    let contract = cart_contract();
    let normalizer = ExchangeNormalizer::default();
    let id = OperationId::new("cart-get").expect("valid id");
    let template = PathTemplate::new("/carts/{id}").expect("valid template");

    c.bench_function("normalize_cart_get", |b| {
        b.iter(|| {
            normalizer
                .normalize(&id, HttpMethod::Get, &template, &contract, black_box(cart_example(1)))
                .expect("valid exchange")
        });
    });

    c.bench_function("merge_and_emit_100", |b| {
        b.iter(|| {
            let registry = OperationRegistry::new();
            for i in 0..100 {
                let op = normalizer
                    .normalize(&id, HttpMethod::Get, &template, &contract, cart_example(i))
                    .expect("valid exchange");
                registry.merge(op).expect("no conflict");
            }
            black_box(SpecEmitter::default().emit(&registry).expect("non-empty registry"))
        });
    });
}

criterion_group!(benches, recorder_benchmark);
criterion_main!(benches);
