//! # Contact Book
//!
//! Keeps the contacts resource, its last known dataset and the [`ContactStore`] in step.
//!
//! ## Lifecycle
//! 1. `bind` once the pod root is known, creating the resource on a 404 only
//! 2. Every write edits a copy of the dataset, saves it whole, then refreshes the store
//! 3. `unbind` on logout
//!
//! ## Failures
//! Nothing is retried. A resource that exists but cannot be read is never
//! overwritten, `bind` fails instead. A failed save is logged and returned, the dataset and
//! the store keep their previous contents.
use pod::{Contact, Dataset, PodClient, PodError, Url, contacts_from_dataset};
use tokio::sync::Mutex;
use tracing::{error, info};
use uuid::Uuid;

use crate::{error::AppError, store::ContactStore};

struct Binding {
    client: PodClient,
    contacts_url: Url,
    dataset: Dataset,
}

#[derive(Default)]
pub struct ContactBook {
    store: ContactStore,
    binding: Mutex<Option<Binding>>,
}

impl ContactBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> &ContactStore {
        &self.store
    }

    pub async fn contacts_url(&self) -> Option<Url> {
        self.binding
            .lock()
            .await
            .as_ref()
            .map(|binding| binding.contacts_url.clone())
    }

    /// Points the book at `<pod_root>/<contacts_path>` and loads it.
    pub async fn bind(
        &self,
        client: PodClient,
        pod_root: &Url,
        contacts_path: &str,
    ) -> Result<Url, AppError> {
        let contacts_url = pod_root.join(contacts_path).map_err(PodError::from)?;
        info!("Using contacts at {contacts_url}");

        let mut guard = self.binding.lock().await;
        let binding = guard.insert(Binding {
            client,
            contacts_url: contacts_url.clone(),
            dataset: Dataset::new(),
        });

        if let Err(e) = establish_contacts_url(binding).await {
            *guard = None;
            return Err(e);
        }

        self.update_contacts_state(&binding.dataset);

        Ok(contacts_url)
    }

    pub async fn unbind(&self) {
        *self.binding.lock().await = None;
        self.store.clear();
    }

    pub async fn refresh_contacts_state(&self) -> Result<(), AppError> {
        let mut guard = self.binding.lock().await;
        let binding = guard.as_mut().ok_or(AppError::NotBound)?;

        match binding.client.get_dataset(&binding.contacts_url).await {
            Ok(dataset) => {
                self.update_contacts_state(&dataset);
                binding.dataset = dataset;
                Ok(())
            }
            Err(e) => {
                error!("Failed to refresh {}: {e}", binding.contacts_url);
                Err(e.into())
            }
        }
    }

    pub fn update_contacts_state(&self, dataset: &Dataset) {
        self.store.set(contacts_from_dataset(dataset));
    }

    pub async fn create_contact_in_pod(&self, contact: &Contact) -> Result<(), AppError> {
        let mut guard = self.binding.lock().await;
        let binding = guard.as_mut().ok_or(AppError::NotBound)?;

        let url = format!("{}#{}", binding.contacts_url, Uuid::new_v4());
        let mut dataset = binding.dataset.clone();
        dataset.set_thing(contact.to_thing(&url));

        self.save(binding, dataset).await
    }

    /// Replaces the contact shown at `key`.
    pub async fn edit_contact_in_pod(&self, key: usize, contact: &Contact) -> Result<(), AppError> {
        let mut guard = self.binding.lock().await;
        let binding = guard.as_mut().ok_or(AppError::NotBound)?;

        let existing = self
            .store
            .get_at(key)
            .ok_or(AppError::UnknownContact(key))?;
        let mut dataset = binding.dataset.clone();
        dataset.set_thing(contact.to_thing(&existing.id));

        self.save(binding, dataset).await
    }

    /// Removes every contact shown at `keys`, all or nothing.
    pub async fn remove_contacts_in_pod(&self, keys: &[usize]) -> Result<(), AppError> {
        let mut guard = self.binding.lock().await;
        let binding = guard.as_mut().ok_or(AppError::NotBound)?;

        let contacts = self.store.get();
        let mut dataset = binding.dataset.clone();

        for &key in keys {
            let contact = contacts.get(key).ok_or(AppError::UnknownContact(key))?;
            dataset.remove_thing(&contact.id);
        }

        self.save(binding, dataset).await
    }

    async fn save(&self, binding: &mut Binding, dataset: Dataset) -> Result<(), AppError> {
        match binding
            .client
            .save_dataset_at(&binding.contacts_url, &dataset)
            .await
        {
            Ok(saved) => {
                self.update_contacts_state(&saved);
                binding.dataset = saved;
                Ok(())
            }
            Err(e) => {
                error!("Failed to save {}: {e}", binding.contacts_url);
                Err(e.into())
            }
        }
    }
}

/// Loads the contacts resource, creating an empty one only if the pod says it is missing.
async fn establish_contacts_url(binding: &mut Binding) -> Result<(), AppError> {
    match binding.client.get_dataset(&binding.contacts_url).await {
        Ok(dataset) => binding.dataset = dataset,
        Err(e) if e.is_not_found() => {
            info!("Creating {}", binding.contacts_url);
            binding.dataset = binding
                .client
                .create_dataset_at(&binding.contacts_url, &Dataset::new())
                .await?;
        }
        Err(e) => {
            error!("Failed to read {}: {e}", binding.contacts_url);
            return Err(e.into());
        }
    }

    Ok(())
}
