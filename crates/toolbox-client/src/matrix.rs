//! Client-side projection of one role's permissions.

use std::collections::BTreeMap;

use toolbox_models::{PermissionDto, PermissionFlags, RoleId};

use crate::{ClientError, PermissionApi};

/// Advisory cache of a role's permission records.
///
/// Screens without a record resolve to [`PermissionFlags::DENIED`]. After any
/// write the matrix is marked stale and must be refetched before it is read
/// again; the server stays the only authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionMatrix {
    role_id: RoleId,
    entries: BTreeMap<String, PermissionFlags>,
    stale: bool,
}

impl PermissionMatrix {
    /// An empty matrix that has not been fetched yet.
    pub fn new(role_id: RoleId) -> Self {
        Self {
            role_id,
            entries: BTreeMap::new(),
            stale: true,
        }
    }

    /// Builds a fresh matrix; records belonging to other roles are ignored.
    pub fn from_records(role_id: RoleId, records: impl IntoIterator<Item = PermissionDto>) -> Self {
        let entries = records
            .into_iter()
            .filter(|r| r.role_id == role_id)
            .map(|r| (r.screen_name, r.flags))
            .collect();
        Self {
            role_id,
            entries,
            stale: false,
        }
    }

    pub async fn fetch<A>(api: &A, role_id: RoleId) -> Result<Self, ClientError>
    where
        A: PermissionApi + ?Sized,
    {
        let records = api.find_by_role_id(role_id).await?;
        Ok(Self::from_records(role_id, records))
    }

    pub async fn refresh<A>(&mut self, api: &A) -> Result<(), ClientError>
    where
        A: PermissionApi + ?Sized,
    {
        *self = Self::fetch(api, self.role_id).await?;
        Ok(())
    }

    pub fn role_id(&self) -> RoleId {
        self.role_id
    }

    pub fn flags(&self, screen_name: &str) -> PermissionFlags {
        self.entries
            .get(screen_name)
            .copied()
            .unwrap_or(PermissionFlags::DENIED)
    }

    /// The explicit record for a screen, if one was fetched or applied.
    pub fn entry(&self, screen_name: &str) -> Option<PermissionFlags> {
        self.entries.get(screen_name).copied()
    }

    pub fn screens(&self) -> impl Iterator<Item = (&str, PermissionFlags)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn invalidate(&mut self) {
        self.stale = true;
    }

    pub(crate) fn set(&mut self, screen_name: &str, flags: PermissionFlags) {
        self.entries.insert(screen_name.to_string(), flags);
    }

    /// Puts back what [`entry`](Self::entry) returned before a change.
    pub(crate) fn restore(&mut self, screen_name: &str, prior: Option<PermissionFlags>) {
        match prior {
            Some(flags) => self.set(screen_name, flags),
            None => {
                self.entries.remove(screen_name);
            }
        }
    }
}
