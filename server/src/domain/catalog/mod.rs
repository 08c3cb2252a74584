//! Sample product catalog
//!
//! `produtos` references `fornecedores` through the `fornecedor` relation and
//! carries a free-form JSON `dto` column. Seed records ship with the binary.

use std::sync::Arc;

use crate::domain::filters::{EnumType, RecordSchema, SchemaRegistry, SemanticType};

pub const PRODUTOS: &str = "produtos";
pub const FORNECEDORES: &str = "fornecedores";

pub static STATUS_PRODUTO: EnumType = EnumType {
    name: "StatusProduto",
    members: &["ATIVO", "INATIVO", "DESCONTINUADO"],
};

const SEED_PRODUTOS: &str = include_str!("seed/produtos.json");
const SEED_FORNECEDORES: &str = include_str!("seed/fornecedores.json");

pub fn fornecedores_schema() -> RecordSchema {
    RecordSchema::builder(FORNECEDORES)
        .field("id", SemanticType::Integer64)
        .field("nome", SemanticType::Text)
        .field("cidade", SemanticType::Text)
        .build()
}

pub fn produtos_schema(fornecedores: Arc<RecordSchema>) -> RecordSchema {
    RecordSchema::builder(PRODUTOS)
        .field("id", SemanticType::Integer64)
        .field("nome", SemanticType::Text)
        .field("descricao", SemanticType::Text)
        .field("categoria", SemanticType::Text)
        .field("subcategoria", SemanticType::Text)
        .field("preco", SemanticType::DecimalExact)
        .field("estoque", SemanticType::Integer32)
        .field("peso", SemanticType::Float64)
        .field("avaliacao", SemanticType::Float32)
        .field("prioridade", SemanticType::Int16)
        .field("codigoBarras", SemanticType::IntegerBig)
        .field("ativo", SemanticType::Boolean)
        .field("status", SemanticType::Enum(&STATUS_PRODUTO))
        .field("dataCriacao", SemanticType::Date)
        .field("atualizadoEm", SemanticType::DateTime)
        .field("sku", SemanticType::Other("uuid"))
        .field("dto", SemanticType::JsonDocument)
        .relation("fornecedor", fornecedores)
        .build()
}

/// Registry with every catalog record type
pub fn registry() -> SchemaRegistry {
    let fornecedores = Arc::new(fornecedores_schema());
    let produtos = Arc::new(produtos_schema(fornecedores.clone()));

    let mut registry = SchemaRegistry::new();
    registry.register(fornecedores);
    registry.register(produtos);
    registry
}

/// Built-in seed records as `(record, json array)` pairs
pub fn seed() -> [(&'static str, &'static str); 2] {
    [
        (FORNECEDORES, SEED_FORNECEDORES),
        (PRODUTOS, SEED_PRODUTOS),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::filters::{FieldResolver, Operand};

    #[test]
    fn test_registry_contains_both_records() {
        let registry = registry();
        assert_eq!(registry.record_names(), vec![FORNECEDORES, PRODUTOS]);
    }

    #[test]
    fn test_produtos_resolves_relation_and_json() {
        let registry = registry();
        let produtos = registry.get(PRODUTOS).unwrap();

        let Operand::Field(path) = produtos.resolve("fornecedor.cidade").unwrap() else {
            panic!("expected field operand");
        };
        assert_eq!(path.segments, vec!["fornecedor", "cidade"]);

        assert!(matches!(
            produtos.resolve("dto.endereco.cidade").unwrap(),
            Operand::Json(_)
        ));
    }

    #[test]
    fn test_seed_parses_as_json_arrays() {
        for (record, json) in seed() {
            let value: serde_json::Value = serde_json::from_str(json).unwrap();
            assert!(
                value.as_array().is_some_and(|rows| !rows.is_empty()),
                "{record}"
            );
        }
    }
}
