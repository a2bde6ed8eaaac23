use crate::domain::{Customer, NewCustomer};
use crate::observability::{record_mutation, Outcome};
use crate::storage::Storage;
use crate::validation::{is_blank, is_valid_email, is_valid_phone, PHONE_FORMAT_HINT};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Unvalidated customer fields as submitted by a client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerInput {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateCustomerResult {
    pub customer: Option<Customer>,
    pub message: Option<String>,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkCreateCustomersResult {
    pub customers: Vec<Customer>,
    pub errors: Vec<String>,
}

pub struct CustomerUseCase {
    storage: Arc<dyn Storage>,
}

/// Empty or whitespace-only phone numbers count as "not provided".
fn normalized_phone(phone: &Option<String>) -> Option<String> {
    phone.as_deref().map(str::trim).filter(|p| !p.is_empty()).map(str::to_string)
}

impl CustomerUseCase {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Validates and stores one customer. The first failing check ends the request.
    pub async fn create_customer(&self, input: CustomerInput) -> CreateCustomerResult {
        match self.try_create_customer(input).await {
            Ok(customer) => {
                record_mutation("create_customer", Outcome::Success);
                CreateCustomerResult {
                    customer: Some(customer),
                    message: Some("Customer created successfully.".to_string()),
                    errors: Vec::new(),
                }
            }
            Err((outcome, error)) => {
                record_mutation("create_customer", outcome);
                CreateCustomerResult { customer: None, message: None, errors: vec![error] }
            }
        }
    }

    async fn try_create_customer(&self, input: CustomerInput) -> Result<Customer, (Outcome, String)> {
        let reject = |message: String| (Outcome::Rejected, message);

        if is_blank(&input.name) {
            return Err(reject("Name is required.".to_string()));
        }
        let email = input.email.trim();
        if !is_valid_email(email) {
            return Err(reject("Invalid email format.".to_string()));
        }
        let phone = normalized_phone(&input.phone);
        if let Some(phone) = &phone {
            if !is_valid_phone(phone) {
                return Err(reject(format!("Invalid phone format. {PHONE_FORMAT_HINT}")));
            }
        }

        let exists = self.storage.email_exists(email).await.map_err(|e| {
            error!("Email uniqueness check failed: {}", e);
            (Outcome::Failed, format!("Failed to create customer: {e}"))
        })?;
        if exists {
            info!("Rejected customer with duplicate email {}", email);
            return Err(reject("Email already exists.".to_string()));
        }

        let new_customer = NewCustomer { name: input.name.trim().to_string(), email: email.to_string(), phone };
        let customer = self.storage.create_customer(&new_customer).await.map_err(|e| {
            error!("Failed to create customer {}: {}", email, e);
            (Outcome::Failed, format!("Failed to create customer: {e}"))
        })?;
        info!("Created customer {} ({})", customer.id, customer.email);
        Ok(customer)
    }

    /// Validates every row on its own and stores the rows that pass in one
    /// transaction. Rejected rows are reported by their 1-based position.
    pub async fn bulk_create_customers(&self, inputs: Vec<CustomerInput>) -> BulkCreateCustomersResult {
        let mut errors = Vec::new();
        let mut seen_emails: HashSet<String> = HashSet::new();
        let mut accepted = Vec::with_capacity(inputs.len());

        for (idx, input) in inputs.into_iter().enumerate() {
            let row = idx + 1;
            match self.validate_row(row, &input, &seen_emails).await {
                Ok(new_customer) => {
                    seen_emails.insert(new_customer.email.clone());
                    accepted.push(new_customer);
                }
                Err(message) => errors.push(message),
            }
        }

        let customers = if accepted.is_empty() {
            Vec::new()
        } else {
            match self.storage.create_customers(&accepted).await {
                Ok(created) => created,
                Err(e) => {
                    error!("Bulk customer insert rolled back: {}", e);
                    errors.push(format!("Database error: {e}"));
                    Vec::new()
                }
            }
        };

        if !errors.is_empty() {
            warn!("Bulk create: {} created, {} errors", customers.len(), errors.len());
        }
        let outcome = if customers.is_empty() && !errors.is_empty() { Outcome::Rejected } else { Outcome::Success };
        record_mutation("bulk_create_customers", outcome);

        BulkCreateCustomersResult { customers, errors }
    }

    async fn validate_row(
        &self,
        row: usize,
        input: &CustomerInput,
        seen_emails: &HashSet<String>,
    ) -> Result<NewCustomer, String> {
        if is_blank(&input.name) {
            return Err(format!("Row {row}: name is required."));
        }
        let email = input.email.trim();
        if !is_valid_email(email) {
            return Err(format!("Row {row}: invalid email format ({}).", input.email));
        }
        let already_stored = match self.storage.email_exists(email).await {
            Ok(exists) => exists,
            Err(e) => return Err(format!("Row {row}: could not check email ({e}).")),
        };
        if seen_emails.contains(email) || already_stored {
            return Err(format!("Row {row}: email already exists ({email})."));
        }
        let phone = normalized_phone(&input.phone);
        if let Some(phone) = &phone {
            if !is_valid_phone(phone) {
                return Err(format!("Row {row}: invalid phone format ({phone})."));
            }
        }
        Ok(NewCustomer { name: input.name.trim().to_string(), email: email.to_string(), phone })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{CustomerFilter, SqliteStorage};

    fn input(name: &str, email: &str, phone: Option<&str>) -> CustomerInput {
        CustomerInput { name: name.to_string(), email: email.to_string(), phone: phone.map(str::to_string) }
    }

    fn use_case() -> (CustomerUseCase, Arc<SqliteStorage>) {
        let storage = Arc::new(SqliteStorage::open_in_memory().unwrap());
        (CustomerUseCase::new(storage.clone()), storage)
    }

    #[tokio::test]
    async fn creates_customer_with_message() {
        let (use_case, _) = use_case();
        let result = use_case.create_customer(input("Alice", "alice@example.com", Some("+1234567890"))).await;

        assert!(result.errors.is_empty());
        assert_eq!(result.message.as_deref(), Some("Customer created successfully."));
        let customer = result.customer.unwrap();
        assert_eq!(customer.email, "alice@example.com");
        assert_eq!(customer.phone.as_deref(), Some("+1234567890"));
    }

    #[tokio::test]
    async fn duplicate_email_writes_nothing() {
        let (use_case, storage) = use_case();
        use_case.create_customer(input("Alice", "alice@example.com", None)).await;
        let result = use_case.create_customer(input("Other Alice", "alice@example.com", None)).await;

        assert!(result.customer.is_none());
        assert_eq!(result.errors, vec!["Email already exists."]);
        let all = storage.list_customers(&CustomerFilter::default(), None).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Alice");
    }

    #[tokio::test]
    async fn first_failing_check_wins() {
        let (use_case, _) = use_case();

        let bad_email = use_case.create_customer(input("Bob", "not-an-email", Some("555"))).await;
        assert_eq!(bad_email.errors, vec!["Invalid email format."]);

        let bad_phone = use_case.create_customer(input("Bob", "bob@example.com", Some("555"))).await;
        assert_eq!(bad_phone.errors, vec!["Invalid phone format. Use +1234567890 or 123-456-7890."]);

        let no_name = use_case.create_customer(input("  ", "bob@example.com", None)).await;
        assert_eq!(no_name.errors, vec!["Name is required."]);
    }

    #[tokio::test]
    async fn blank_phone_is_treated_as_absent() {
        let (use_case, _) = use_case();
        let result = use_case.create_customer(input("Carol", "carol@example.com", Some(""))).await;
        assert_eq!(result.customer.unwrap().phone, None);
    }

    #[tokio::test]
    async fn bulk_create_reports_each_bad_row() {
        let (use_case, storage) = use_case();
        use_case.create_customer(input("Existing", "taken@example.com", None)).await;

        let result = use_case
            .bulk_create_customers(vec![
                input("Alice", "alice@example.com", Some("123-456-7890")),
                input("", "nobody@example.com", None),
                input("Bad Email", "bad-email", None),
                input("Alice Again", "alice@example.com", None),
                input("Taken", "taken@example.com", None),
                input("Bad Phone", "phone@example.com", Some("12345")),
                input("Bob", "bob@example.com", None),
            ])
            .await;

        assert_eq!(
            result.errors,
            vec![
                "Row 2: name is required.",
                "Row 3: invalid email format (bad-email).",
                "Row 4: email already exists (alice@example.com).",
                "Row 5: email already exists (taken@example.com).",
                "Row 6: invalid phone format (12345).",
            ]
        );
        let emails: Vec<_> = result.customers.iter().map(|c| c.email.as_str()).collect();
        assert_eq!(emails, vec!["alice@example.com", "bob@example.com"]);
        assert_eq!(storage.list_customers(&CustomerFilter::default(), None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn bulk_create_with_no_valid_rows_writes_nothing() {
        let (use_case, storage) = use_case();
        let result = use_case.bulk_create_customers(vec![input("", "x@example.com", None)]).await;
        assert!(result.customers.is_empty());
        assert_eq!(result.errors.len(), 1);
        assert!(storage.list_customers(&CustomerFilter::default(), None).await.unwrap().is_empty());
    }
}
