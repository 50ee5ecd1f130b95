//! Save and delete synchronization with the server.
//!
//! [`Editor`] owns the page and drives every operation that changes it. It
//! runs on a single thread: the page lives in a [`RefCell`] and no borrow is
//! held across an `.await`, so several operations may be in flight at once
//! while the per-control disabled flag keeps a group from saving twice.

use std::cell::{Ref, RefCell, RefMut};

use crate::{
    collect::collect,
    data::{
        Page, SaveTarget, StatusMessage,
        page::{DELETE_LABEL, DELETING_LABEL, DeletePolicy, SAVE_LABEL, SAVING_LABEL},
    },
    dialog::Dialogs,
    error::{CollectError, ItemError, TransportError},
    items::{self, AddOutcome, DeleteOutcome},
    path::SEPARATOR,
    transport::{Call, Transport},
};

/// Message shown after a successful save.
pub const SAVED_MESSAGE: &str = "Saved";

/// Result of a save request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The server accepted the properties.
    Saved,
    /// A save of this group is already in flight; nothing was sent.
    Busy,
    /// Validation failed; nothing was sent.
    Invalid(CollectError),
    /// The server call failed; the collected tree was discarded.
    Failed(TransportError),
}

enum Step<T> {
    Send(Call),
    Stop(T),
}

/// Drives collection, item management and server synchronization for a page.
pub struct Editor<T, D> {
    page: RefCell<Page>,
    transport: T,
    dialogs: RefCell<D>,
}

impl<T: Transport, D: Dialogs> Editor<T, D> {
    /// Create an editor over `page`.
    pub fn new(page: Page, transport: T, dialogs: D) -> Self {
        Self {
            page: RefCell::new(page),
            transport,
            dialogs: RefCell::new(dialogs),
        }
    }

    /// Current page state.
    pub fn page(&self) -> Ref<'_, Page> {
        self.page.borrow()
    }

    /// The dialogs used for prompts, confirmations and alerts.
    pub fn dialogs(&self) -> RefMut<'_, D> {
        self.dialogs.borrow_mut()
    }

    /// The transport used for server calls.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Consume the editor, returning the page.
    pub fn into_page(self) -> Page {
        self.page.into_inner()
    }

    /// Enter `input` into the control resolving to `key`.
    ///
    /// The input is read according to the control's value type. Marks the
    /// page as having unsaved changes. Returns the number of controls
    /// updated.
    pub fn set_value(&self, key: &str, input: &str) -> usize {
        let mut page = self.page.borrow_mut();
        let mut updated = 0;
        page.visit_controls_mut(&mut |k, control| {
            if k == key {
                control.set_input(input);
                updated += 1;
            }
        });
        if updated > 0 {
            page.dirty = true;
        }
        updated
    }

    /// Collect `group_id` and send it to the server.
    ///
    /// A no-op while a save of the same group is in flight. Validation
    /// failures are alerted and the offending control focused before any
    /// network call. The outcome is also recorded on the page: the save
    /// control returns to idle with an inline success or error message.
    pub async fn save(&self, group_id: &str) -> Result<SaveOutcome, ItemError> {
        let call = match self.begin_save(group_id)? {
            Step::Send(call) => call,
            Step::Stop(outcome) => return Ok(outcome),
        };
        let result = self.transport.call(call).await;
        Ok(self.finish_save(group_id, result))
    }

    fn begin_save(&self, group_id: &str) -> Result<Step<SaveOutcome>, ItemError> {
        let mut page = self.page.borrow_mut();
        let project = page.project.clone();
        let group = page
            .group_mut(group_id)
            .ok_or_else(|| ItemError::UnknownGroup(group_id.to_string()))?;

        if group.save_button.disabled {
            debug!("save of {group_id} already in flight");
            return Ok(Step::Stop(SaveOutcome::Busy));
        }

        let tree = match collect(group, true) {
            Ok(tree) => tree,
            Err(e) => {
                page.focus = Some(e.path().to_string());
                self.dialogs.borrow_mut().alert(&e.to_string());
                return Ok(Step::Stop(SaveOutcome::Invalid(e)));
            }
        };

        group.save_button.begin(SAVING_LABEL);
        group.status = None;
        let call = match &group.target {
            SaveTarget::Rest { url, csrf_token } => Call::Put {
                url: url.clone(),
                csrf_token: csrf_token.clone(),
                body: tree.into_json(),
            },
            SaveTarget::Rpc => Call::set_properties(&project, tree.flatten().into_json()),
        };
        info!("saving {group_id}: {}", call.describe());
        Ok(Step::Send(call))
    }

    fn finish_save(
        &self,
        group_id: &str,
        result: Result<serde_json::Value, TransportError>,
    ) -> SaveOutcome {
        let mut page = self.page.borrow_mut();
        match page.group_mut(group_id) {
            Some(group) => {
                group.save_button.finish(SAVE_LABEL);
                group.status = Some(match &result {
                    Ok(_) => StatusMessage::success(SAVED_MESSAGE),
                    Err(e) => StatusMessage::error(e),
                });
            }
            None => warn!("group {group_id} disappeared while saving"),
        }
        match result {
            Ok(_) => {
                page.dirty = false;
                info!("saved {group_id}");
                SaveOutcome::Saved
            }
            Err(e) => {
                warn!("saving {group_id} failed: {e}");
                SaveOutcome::Failed(e)
            }
        }
    }

    /// Ask for a name and add a new item to the container with `container_prefix`.
    pub fn add_item(&self, container_prefix: &str) -> Result<AddOutcome, ItemError> {
        let mut page = self.page.borrow_mut();
        let mut dialogs = self.dialogs.borrow_mut();
        items::add_item(&mut page, container_prefix, &mut *dialogs)
    }

    /// Expand or collapse an item's panel.
    pub fn toggle_item(&self, path_prefix: &str) -> Result<bool, ItemError> {
        items::toggle_item(&mut self.page.borrow_mut(), path_prefix)
    }

    /// Delete the item at `path_prefix` after confirmation.
    ///
    /// Containers with [`DeletePolicy::Local`] drop the item at once. With
    /// [`DeletePolicy::Remote`] the item's properties are deleted on the
    /// server first; on failure the item stays, its delete control is
    /// re-enabled and the error is shown next to it.
    pub async fn delete_item(&self, path_prefix: &str) -> Result<DeleteOutcome, ItemError> {
        let call = match self.begin_delete(path_prefix)? {
            Step::Send(call) => call,
            Step::Stop(outcome) => return Ok(outcome),
        };
        let result = self.transport.call(call).await;
        Ok(self.finish_delete(path_prefix, result))
    }

    fn begin_delete(&self, path_prefix: &str) -> Result<Step<DeleteOutcome>, ItemError> {
        let mut page = self.page.borrow_mut();
        let mut dialogs = self.dialogs.borrow_mut();
        let unknown = || ItemError::UnknownItem(path_prefix.to_string());

        let (container, idx) = page.item_mut(path_prefix).ok_or_else(unknown)?;
        if container.delete_policy == DeletePolicy::Local {
            return items::delete_item(&mut page, path_prefix, &mut *dialogs).map(Step::Stop);
        }
        if container.items[idx].delete_button.disabled {
            return Ok(Step::Stop(DeleteOutcome::Busy));
        }
        if !items::confirm_delete(&page, path_prefix, &mut *dialogs)? {
            return Ok(Step::Stop(DeleteOutcome::Cancelled));
        }

        let project = page.project.clone();
        let (container, idx) = page.item_mut(path_prefix).ok_or_else(unknown)?;
        let item = &mut container.items[idx];
        item.delete_button.begin(DELETING_LABEL);
        item.status = None;
        let prefix = format!("{path_prefix}{SEPARATOR}");
        info!("deleting properties under {prefix}");
        Ok(Step::Send(Call::delete_by_prefix(&project, &prefix)))
    }

    fn finish_delete(
        &self,
        path_prefix: &str,
        result: Result<serde_json::Value, TransportError>,
    ) -> DeleteOutcome {
        let mut page = self.page.borrow_mut();
        match result {
            Ok(_) => {
                page.remove_item(path_prefix);
                info!("deleted {path_prefix}");
                DeleteOutcome::Removed
            }
            Err(e) => {
                warn!("deleting {path_prefix} failed: {e}");
                if let Some((container, idx)) = page.item_mut(path_prefix) {
                    let item = &mut container.items[idx];
                    item.delete_button.finish(DELETE_LABEL);
                    item.status = Some(StatusMessage::error(&e));
                }
                DeleteOutcome::Failed(e.to_string())
            }
        }
    }
}
