//! View/state controller for the admin page.
//!
//! [`AdminController`] is the single owner of every piece of mutable UI
//! state: the cached product list, the create-form draft and its errors,
//! the image slot, loading/submitting flags, the pending delete
//! confirmation and the toast. All mutation goes through its methods.
//!
//! Network-bound operations come in two halves (`begin_*` / `finish_*`)
//! so an event loop can keep handling input while a request is in flight.
//! The `mount`, `submit` and `confirm_and_delete` helpers run both halves
//! back to back.
//!
//! The cached list only changes after the server acknowledges an
//! operation; nothing is added or removed optimistically.

use std::collections::HashSet;
use std::sync::Arc;

use almirah_client::ClientError;
use almirah_core::error::CoreError;
use almirah_core::image_intake::{ImageFile, ImageIntake, IntakeError, PreviewJob, PreviewReady};
use almirah_core::notification::{Notification, Toaster};
use almirah_core::product::{Category, Field, NewProduct, Product, ProductDraft};
use almirah_core::types::DbId;
use almirah_core::validation::FieldErrors;
use tokio::time::Instant;

use crate::catalog::CatalogApi;

pub const CREATED_MESSAGE: &str = "Product created successfully!";
pub const DELETED_MESSAGE: &str = "Product deleted successfully!";
pub const DELETE_FAILED_MESSAGE: &str =
    "Failed to delete product. Endpoint may not be implemented.";

/// Shown in place of a product image that failed to load.
pub const PLACEHOLDER_IMAGE_URL: &str = "https://via.placeholder.com/400x300?text=No+Image";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    LoadingList,
    SubmittingCreate,
    ListLoaded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The server stored the product under this id.
    Created(DbId),
    /// The server rejected the request or could not be reached.
    Failed,
    /// The draft has field errors; no request was made.
    Invalid,
    /// A create request is already in flight; no request was made.
    AlreadySubmitting,
}

/// Payload for one create request, produced by
/// [`AdminController::begin_submit`].
#[derive(Debug, Clone)]
pub struct CreateRequest {
    pub product: NewProduct,
    pub image: ImageFile,
}

/// One list request, produced by [`AdminController::begin_load`].
///
/// Only the ticket of the most recent `begin_load` is applied by
/// [`AdminController::finish_load`]; results for older tickets are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub token: u64,
    pub filter: Option<Category>,
}

pub struct AdminController<A> {
    api: Arc<A>,
    products: Vec<Product>,
    draft: ProductDraft,
    errors: FieldErrors,
    image: ImageIntake,
    loading: bool,
    load_generation: u64,
    submitting: bool,
    loaded: bool,
    filter: Option<Category>,
    pending_delete: Option<DbId>,
    failed_images: HashSet<DbId>,
    toaster: Toaster,
}

impl<A: CatalogApi> AdminController<A> {
    pub fn new(api: A) -> Self {
        Self::with_shared(Arc::new(api))
    }

    pub fn with_shared(api: Arc<A>) -> Self {
        Self {
            api,
            products: Vec::new(),
            draft: ProductDraft::default(),
            errors: FieldErrors::new(),
            image: ImageIntake::new(),
            loading: false,
            load_generation: 0,
            submitting: false,
            loaded: false,
            filter: None,
            pending_delete: None,
            failed_images: HashSet::new(),
            toaster: Toaster::new(),
        }
    }

    /// Handle to the catalog for issuing requests outside the controller.
    pub fn api(&self) -> Arc<A> {
        Arc::clone(&self.api)
    }

    // ---- listing ----

    /// Initial load: `Idle → LoadingList → ListLoaded`, or back to `Idle`
    /// with an error toast.
    pub async fn mount(&mut self) {
        self.refresh(None).await;
    }

    /// Reload the list, optionally restricted to one category.
    pub async fn refresh(&mut self, filter: Option<Category>) {
        let ticket = self.begin_load(filter);
        let result = self.api.list_products(ticket.filter.as_ref()).await;
        self.finish_load(ticket, result);
    }

    /// Mark the list as loading and issue the ticket for a new request.
    /// Any request started earlier is superseded.
    pub fn begin_load(&mut self, filter: Option<Category>) -> LoadTicket {
        self.load_generation += 1;
        self.loading = true;
        tracing::debug!(token = self.load_generation, ?filter, "Loading products");
        LoadTicket {
            token: self.load_generation,
            filter,
        }
    }

    /// Apply a finished list request. Returns `true` when the result was
    /// applied and succeeded.
    ///
    /// A superseded ticket is ignored and the list stays loading until the
    /// newest request resolves. The filter is updated together with the
    /// products it produced, and a pending delete for a product that is no
    /// longer listed is dropped.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<Product>, ClientError>,
    ) -> bool {
        if ticket.token != self.load_generation {
            tracing::debug!(
                token = ticket.token,
                newest = self.load_generation,
                "Discarded superseded product list"
            );
            return false;
        }
        self.loading = false;
        match result {
            Ok(products) => {
                tracing::info!(count = products.len(), "Product list refreshed");
                self.products = products;
                self.filter = ticket.filter;
                self.failed_images.clear();
                self.loaded = true;
                if let Some(id) = self.pending_delete {
                    if !self.products.iter().any(|p| p.id == id) {
                        tracing::debug!(id, "Pending delete dropped, product no longer listed");
                        self.pending_delete = None;
                    }
                }
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "Error fetching products");
                self.toaster.error(e.user_message());
                false
            }
        }
    }

    // ---- draft editing ----

    /// Edit a text field of the draft and clear that field's error.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) -> Result<(), CoreError> {
        self.draft.set(field, value)?;
        self.errors.clear(field);
        Ok(())
    }

    pub fn set_category(&mut self, category: Category) {
        self.draft.category = category;
        self.errors.clear(Field::Category);
    }

    // ---- image slot ----

    /// File-picker entry point. Returns the preview job to run when the
    /// file is accepted; a rejection is recorded as the image field error.
    pub fn pick_image(&mut self, file: ImageFile) -> Option<PreviewJob> {
        let result = self.image.pick(file);
        self.record_intake(result)
    }

    /// Drag-and-drop entry point, same rules as [`pick_image`](Self::pick_image).
    pub fn drop_image(&mut self, file: ImageFile) -> Option<PreviewJob> {
        let result = self.image.drop_file(file);
        self.record_intake(result)
    }

    /// Record a file that could not even be read as an image field error.
    pub fn reject_image(&mut self, error: &IntakeError) {
        tracing::warn!(error = %error, "Image rejected");
        self.errors.insert(Field::Image, error.to_string());
    }

    /// The picker was closed without choosing a file: the slot is emptied
    /// and its error cleared.
    pub fn clear_picker(&mut self) {
        self.image.pick_none();
        self.errors.clear(Field::Image);
    }

    pub fn remove_image(&mut self) {
        self.image.remove();
        self.errors.clear(Field::Image);
    }

    pub fn drag_enter(&mut self) {
        self.image.drag_enter();
    }

    pub fn drag_leave(&mut self) {
        self.image.drag_leave();
    }

    /// Apply a finished preview; stale previews are ignored.
    pub fn complete_preview(&mut self, ready: PreviewReady) -> bool {
        self.image.complete_preview(ready)
    }

    fn record_intake(&mut self, result: Result<PreviewJob, IntakeError>) -> Option<PreviewJob> {
        match result {
            Ok(job) => {
                self.errors.clear(Field::Image);
                Some(job)
            }
            Err(e) => {
                self.reject_image(&e);
                None
            }
        }
    }

    // ---- create ----

    /// Validate and submit the draft, waiting for the server's answer.
    pub async fn submit(&mut self) -> SubmitOutcome {
        let request = match self.begin_submit() {
            Ok(request) => request,
            Err(outcome) => return outcome,
        };
        let result = self
            .api
            .create_product(&request.product, &request.image)
            .await;
        self.finish_submit(result)
    }

    /// Validate the draft and enter `SubmittingCreate`.
    ///
    /// Fails without side effects other than storing field errors when the
    /// draft is invalid, and without any side effect while another create
    /// is in flight.
    pub fn begin_submit(&mut self) -> Result<CreateRequest, SubmitOutcome> {
        if self.submitting {
            tracing::debug!("Submit ignored, create already in flight");
            return Err(SubmitOutcome::AlreadySubmitting);
        }

        let image = self.image.file().cloned();
        let product = match self.draft.to_new_product(image.is_some()) {
            Ok(product) => product,
            Err(errors) => {
                tracing::debug!(errors = errors.len(), "Draft failed validation");
                self.errors = errors;
                return Err(SubmitOutcome::Invalid);
            }
        };
        let Some(image) = image else {
            return Err(SubmitOutcome::Invalid);
        };

        self.errors.clear_all();
        self.submitting = true;
        Ok(CreateRequest { product, image })
    }

    /// Apply a finished create request.
    pub fn finish_submit(&mut self, result: Result<Product, ClientError>) -> SubmitOutcome {
        self.submitting = false;
        match result {
            Ok(product) => {
                let id = product.id;
                tracing::info!(id, name = %product.name, "Product added to list");
                self.products.push(product);
                self.draft = ProductDraft::default();
                self.image.remove();
                self.errors.clear_all();
                self.toaster.success(CREATED_MESSAGE);
                SubmitOutcome::Created(id)
            }
            Err(e) => {
                tracing::error!(error = %e, "Error creating product");
                self.toaster.error(e.user_message());
                SubmitOutcome::Failed
            }
        }
    }

    // ---- delete ----

    /// Ask for confirmation before deleting. Returns `false` (and asks
    /// nothing) when the id is not in the list.
    pub fn request_delete(&mut self, id: DbId) -> bool {
        if !self.products.iter().any(|p| p.id == id) {
            return false;
        }
        self.pending_delete = Some(id);
        true
    }

    /// Decline the pending confirmation. No request is made.
    pub fn cancel_delete(&mut self) -> Option<DbId> {
        self.pending_delete.take()
    }

    /// Accept the pending confirmation and return the id to delete.
    pub fn confirm_delete(&mut self) -> Option<DbId> {
        self.pending_delete.take()
    }

    /// Apply a finished delete request. Returns `true` on success.
    pub fn finish_delete(&mut self, id: DbId, result: Result<(), ClientError>) -> bool {
        match result {
            Ok(()) => {
                self.products.retain(|p| p.id != id);
                self.failed_images.remove(&id);
                self.toaster.success(DELETED_MESSAGE);
                true
            }
            Err(e) => {
                tracing::error!(id, error = %e, "Error deleting product");
                self.toaster.error(DELETE_FAILED_MESSAGE);
                false
            }
        }
    }

    /// Confirm the pending delete and wait for the server. `None` when
    /// nothing was awaiting confirmation.
    pub async fn confirm_and_delete(&mut self) -> Option<bool> {
        let id = self.confirm_delete()?;
        let result = self.api.delete_product(id).await;
        Some(self.finish_delete(id, result))
    }

    // ---- images in the grid ----

    pub fn mark_image_failed(&mut self, id: DbId) {
        self.failed_images.insert(id);
    }

    /// Image URL to display for a product, with the placeholder for images
    /// that failed to load.
    pub fn image_src(&self, product: &Product) -> String {
        if self.failed_images.contains(&product.id) {
            PLACEHOLDER_IMAGE_URL.to_string()
        } else {
            self.api.resolve_image_url(&product.image_url)
        }
    }

    // ---- toasts ----

    pub fn toast(&self, now: Instant) -> Option<&Notification> {
        self.toaster.current(now)
    }

    pub fn dismiss_toast(&mut self) {
        self.toaster.dismiss();
    }

    /// Drop an expired toast; `true` if one was removed.
    pub fn prune_toast(&mut self, now: Instant) -> bool {
        self.toaster.prune(now)
    }

    pub fn toaster(&self) -> &Toaster {
        &self.toaster
    }

    // ---- read access for the view ----

    pub fn phase(&self) -> Phase {
        if self.submitting {
            Phase::SubmittingCreate
        } else if self.loading {
            Phase::LoadingList
        } else if self.loaded {
            Phase::ListLoaded
        } else {
            Phase::Idle
        }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn draft(&self) -> &ProductDraft {
        &self.draft
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn image(&self) -> &ImageIntake {
        &self.image
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn filter(&self) -> Option<&Category> {
        self.filter.as_ref()
    }

    pub fn pending_delete(&self) -> Option<DbId> {
        self.pending_delete
    }
}
