//! Customer business logic - registration, search, edits, deletion and document uploads.
//!
//! Document images are pushed to the configured [`ObjectStore`] and only their public
//! URLs are written back onto the customer row.

use crate::{
    entities::{Customer, Rental, customer, rental},
    errors::{Error, Result},
    storage::{ObjectStore, content_type_for},
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, prelude::*};

/// Editable fields of a customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerInput {
    /// Full legal name
    pub full_name: String,
    /// CPF document number
    pub document_cpf: String,
    /// Contact phone
    pub phone: String,
    /// Optional e-mail
    pub email: Option<String>,
    /// Optional address
    pub address: Option<String>,
}

impl CustomerInput {
    fn validate(&self) -> Result<()> {
        if self.full_name.trim().is_empty() {
            return Err(Error::validation("Customer name cannot be empty"));
        }
        if self.document_cpf.trim().is_empty() {
            return Err(Error::validation("Customer CPF cannot be empty"));
        }
        if self.phone.trim().is_empty() {
            return Err(Error::validation("Customer phone cannot be empty"));
        }
        Ok(())
    }
}

/// Which uploaded document a file is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Driver's license (CNH)
    Cnh,
    /// Proof of residence
    Residence,
}

impl DocumentKind {
    /// Tag used inside the object path
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Cnh => "cnh",
            Self::Residence => "residence",
        }
    }

    /// Display label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cnh => "CNH",
            Self::Residence => "Comprovante de residência",
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Registers a new customer.
pub async fn create_customer(
    db: &DatabaseConnection,
    input: CustomerInput,
) -> Result<customer::Model> {
    input.validate()?;

    let customer = customer::ActiveModel {
        full_name: Set(input.full_name.trim().to_string()),
        document_cpf: Set(input.document_cpf.trim().to_string()),
        phone: Set(input.phone.trim().to_string()),
        email: Set(non_empty(input.email)),
        address: Set(non_empty(input.address)),
        cnh_image_url: Set(None),
        residence_proof_url: Set(None),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let result = customer.insert(db).await?;
    tracing::info!(customer_id = result.id, "Customer registered");
    Ok(result)
}

/// Lists every customer alphabetically by name.
pub async fn list_customers(db: &DatabaseConnection) -> Result<Vec<customer::Model>> {
    Customer::find()
        .order_by_asc(customer::Column::FullName)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a customer by primary key.
pub async fn get_customer_by_id(
    db: &DatabaseConnection,
    customer_id: i64,
) -> Result<Option<customer::Model>> {
    Customer::find_by_id(customer_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Replaces the contact fields of a customer. Document URLs are kept.
pub async fn update_customer(
    db: &DatabaseConnection,
    customer_id: i64,
    input: CustomerInput,
) -> Result<customer::Model> {
    input.validate()?;

    let existing = Customer::find_by_id(customer_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("customer", customer_id))?;

    let mut customer: customer::ActiveModel = existing.into();
    customer.full_name = Set(input.full_name.trim().to_string());
    customer.document_cpf = Set(input.document_cpf.trim().to_string());
    customer.phone = Set(input.phone.trim().to_string());
    customer.email = Set(non_empty(input.email));
    customer.address = Set(non_empty(input.address));

    customer.update(db).await.map_err(Into::into)
}

/// Deletes a customer that has no rentals.
///
/// Customers with contracts on record are kept; the error names the rental count.
pub async fn delete_customer(db: &DatabaseConnection, customer_id: i64) -> Result<()> {
    let customer = Customer::find_by_id(customer_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("customer", customer_id))?;

    let rentals = Rental::find()
        .filter(rental::Column::CustomerId.eq(customer_id))
        .count(db)
        .await?;

    if rentals > 0 {
        return Err(Error::InUse {
            entity: "customer",
            key: customer.full_name,
            dependents: format!("{rentals} rental contract(s)"),
        });
    }

    customer.delete(db).await?;
    tracing::info!(customer_id, "Customer deleted");
    Ok(())
}

/// Filters customers whose name contains the term (case-insensitive) or whose CPF contains it.
#[must_use]
pub fn filter_customers(customers: &[customer::Model], term: &str) -> Vec<customer::Model> {
    let term = term.trim();
    let lowered = term.to_lowercase();

    customers
        .iter()
        .filter(|c| c.full_name.to_lowercase().contains(&lowered) || c.document_cpf.contains(term))
        .cloned()
        .collect()
}

/// Builds the object path for an uploaded document.
///
/// Shape: `documents/<customer_id>_<kind>_<nonce>.<ext>`, where the extension is whatever
/// follows the last `.` of the original file name (`bin` when there is none).
#[must_use]
pub fn document_object_path(customer_id: i64, kind: DocumentKind, file_name: &str, nonce: i64) -> String {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
        .unwrap_or("bin");
    format!("documents/{customer_id}_{}_{nonce}.{extension}", kind.tag())
}

/// Uploads a document image and stores its public URL on the customer.
pub async fn attach_document(
    db: &DatabaseConnection,
    store: &dyn ObjectStore,
    customer_id: i64,
    kind: DocumentKind,
    file_name: &str,
    bytes: Vec<u8>,
) -> Result<customer::Model> {
    let existing = Customer::find_by_id(customer_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("customer", customer_id))?;

    let nonce = chrono::Utc::now().timestamp_micros();
    let path = document_object_path(customer_id, kind, file_name, nonce);
    store.upload(&path, bytes, &content_type_for(&path)).await?;
    let public_url = store.public_url(&path);
    tracing::info!(customer_id, kind = kind.tag(), %path, "Customer document uploaded");

    let mut customer: customer::ActiveModel = existing.into();
    match kind {
        DocumentKind::Cnh => customer.cnh_image_url = Set(Some(public_url)),
        DocumentKind::Residence => customer.residence_proof_url = Set(Some(public_url)),
    }

    customer.update(db).await.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::storage::LocalObjectStore;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_customer_validation() -> Result<()> {
        let db = setup_test_db().await?;

        let mut input = customer_input("Maria");
        input.document_cpf = String::new();
        assert!(matches!(
            create_customer(&db, input).await.unwrap_err(),
            Error::Validation { .. }
        ));

        let mut input = customer_input("Maria");
        input.phone = "   ".to_string();
        assert!(create_customer(&db, input).await.is_err());

        Ok(())
    }

    #[tokio::test]
    async fn test_create_customer_blank_optionals_become_none() -> Result<()> {
        let db = setup_test_db().await?;

        let mut input = customer_input("Maria Souza");
        input.email = Some("  ".to_string());
        input.address = Some("Rua A, 10".to_string());
        let customer = create_customer(&db, input).await?;

        assert_eq!(customer.email, None);
        assert_eq!(customer.address.as_deref(), Some("Rua A, 10"));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_customers_alphabetical() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_customer(&db, "Carlos").await?;
        create_test_customer(&db, "Ana").await?;
        create_test_customer(&db, "Bruno").await?;

        let names: Vec<String> = list_customers(&db)
            .await?
            .into_iter()
            .map(|c| c.full_name)
            .collect();
        assert_eq!(names, vec!["Ana", "Bruno", "Carlos"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_customer() -> Result<()> {
        let db = setup_test_db().await?;
        let customer = create_test_customer(&db, "Ana").await?;

        let mut input = customer_input("Ana Paula");
        input.phone = "(11) 98888-7777".to_string();
        let updated = update_customer(&db, customer.id, input).await?;
        assert_eq!(updated.full_name, "Ana Paula");
        assert_eq!(updated.phone, "(11) 98888-7777");

        assert!(matches!(
            update_customer(&db, 999, customer_input("X")).await.unwrap_err(),
            Error::NotFound { entity: "customer", .. }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_customer_with_rental_is_refused() -> Result<()> {
        let (db, customer, car) = setup_with_customer_and_car().await?;
        create_test_rental(&db, customer.id, car.id).await?;

        let err = delete_customer(&db, customer.id).await.unwrap_err();
        assert!(matches!(err, Error::InUse { entity: "customer", .. }));
        assert!(err.to_string().contains("rental"));

        // Row is still there
        assert!(get_customer_by_id(&db, customer.id).await?.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_customer_without_rentals() -> Result<()> {
        let db = setup_test_db().await?;
        let customer = create_test_customer(&db, "Ana").await?;

        delete_customer(&db, customer.id).await?;
        assert!(get_customer_by_id(&db, customer.id).await?.is_none());
        Ok(())
    }

    #[test]
    fn test_filter_customers_by_name_or_cpf() {
        let now = chrono::Utc::now();
        let make = |id, name: &str, cpf: &str| customer::Model {
            id,
            full_name: name.to_string(),
            document_cpf: cpf.to_string(),
            phone: "11999990000".to_string(),
            email: None,
            address: None,
            cnh_image_url: None,
            residence_proof_url: None,
            created_at: now,
        };
        let customers = vec![
            make(1, "João Silva", "123.456.789-00"),
            make(2, "Maria Souza", "987.654.321-00"),
        ];

        assert_eq!(filter_customers(&customers, "joão")[0].id, 1);
        assert_eq!(filter_customers(&customers, "987.654")[0].id, 2);
        assert_eq!(filter_customers(&customers, "").len(), 2);
        assert!(filter_customers(&customers, "pedro").is_empty());
    }

    #[test]
    fn test_document_object_path() {
        assert_eq!(
            document_object_path(7, DocumentKind::Cnh, "foto.cnh.JPG", 42),
            "documents/7_cnh_42.JPG"
        );
        assert_eq!(
            document_object_path(7, DocumentKind::Residence, "scan", 1),
            "documents/7_residence_1.bin"
        );
    }

    #[tokio::test]
    async fn test_attach_document_writes_public_url() -> Result<()> {
        let db = setup_test_db().await?;
        let customer = create_test_customer(&db, "Ana").await?;
        let root = std::env::temp_dir().join(format!(
            "fleet-desk-docs-{}",
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        let store = LocalObjectStore::new(root.clone(), "https://files.example/docs");

        let updated = attach_document(
            &db,
            &store,
            customer.id,
            DocumentKind::Cnh,
            "cnh.png",
            vec![1, 2, 3],
        )
        .await?;

        let url = updated.cnh_image_url.unwrap();
        assert!(url.starts_with(&format!("https://files.example/docs/documents/{}_cnh_", customer.id)));
        assert!(url.ends_with(".png"));
        assert!(updated.residence_proof_url.is_none());

        let path = url.trim_start_matches("https://files.example/docs/");
        assert_eq!(std::fs::read(root.join(path))?, vec![1, 2, 3]);

        std::fs::remove_dir_all(root)?;
        Ok(())
    }
}
