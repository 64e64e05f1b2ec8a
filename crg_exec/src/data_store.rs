//! # Data Store
//!
//! Registry of the reference lines (datasets) and contact points in use.
//! Both live in slot maps and are addressed by versioned keys. Freed slots
//! are reused, and a stale key can only ever miss since its version no
//! longer matches.
//!
//! Reference lines are reference counted. Releasing a dataset removes it from
//! the store but contact points already bound to it keep it alive until they
//! are deleted.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, warn};
use slotmap::{new_key_type, Key, SlotMap};
use std::{fmt, sync::Arc};

// Internal
use crate::{
    contact_point::{ContactPoint, CpOptions},
    eval::{EvalError, Pk, Uv, Xy},
    ref_line::ReferenceLine,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

new_key_type! {
    /// Id of a dataset in the store.
    pub struct DataSetId;

    /// Id of a contact point in the store.
    pub struct CpId;
}

/// Registry of datasets and contact points.
#[derive(Debug, Default)]
pub struct DataStore {
    data_sets: SlotMap<DataSetId, Arc<ReferenceLine>>,
    contact_points: SlotMap<CpId, ContactPoint>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur while managing the contents of the store.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum DataStoreError {
    #[error("No dataset with id {0}")]
    UnknownDataSet(DataSetId),

    #[error("No contact point with id {0}")]
    UnknownContactPoint(CpId),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a reference line to the store, returning its id.
    pub fn add_data_set(&mut self, ref_line: ReferenceLine) -> DataSetId {
        let (u_min_m, u_max_m) = ref_line.u_range();
        let num_samples = ref_line.num_samples();

        let id = self.data_sets.insert(Arc::new(ref_line));

        debug!(
            "Dataset {} added: {} samples, u = [{}, {}]",
            id, num_samples, u_min_m, u_max_m
        );

        id
    }

    /// Get a dataset.
    pub fn data_set(&self, id: DataSetId) -> Result<&ReferenceLine, DataStoreError> {
        self.data_set_arc(id).map(Arc::as_ref)
    }

    /// Remove a dataset from the store.
    ///
    /// Contact points bound to it remain valid.
    pub fn release_data_set(&mut self, id: DataSetId) -> Result<(), DataStoreError> {
        match self.data_sets.remove(id) {
            Some(rl) => {
                debug!(
                    "Dataset {} released, {} other reference(s) remain",
                    id,
                    Arc::strong_count(&rl) - 1
                );
                Ok(())
            }
            None => Err(DataStoreError::UnknownDataSet(id)),
        }
    }

    /// Number of datasets currently in the store.
    pub fn num_data_sets(&self) -> usize {
        self.data_sets.len()
    }

    /// Create a new contact point bound to the given dataset.
    pub fn create_contact_point(&mut self, data_set_id: DataSetId) -> Result<CpId, DataStoreError> {
        let ref_line = self.data_set_arc(data_set_id)?.clone();
        let id = self
            .contact_points
            .insert(ContactPoint::new(data_set_id, ref_line));

        debug!("Contact point {} created on dataset {}", id, data_set_id);
        Ok(id)
    }

    /// Delete a contact point. Its dataset is not affected.
    pub fn delete_contact_point(&mut self, id: CpId) -> Result<(), DataStoreError> {
        match self.contact_points.remove(id) {
            Some(_) => {
                debug!("Contact point {} deleted", id);
                Ok(())
            }
            None => Err(DataStoreError::UnknownContactPoint(id)),
        }
    }

    /// Number of contact points currently in the store.
    pub fn num_contact_points(&self) -> usize {
        self.contact_points.len()
    }

    /// Get a contact point.
    pub fn contact_point(&self, id: CpId) -> Result<&ContactPoint, DataStoreError> {
        self.contact_points
            .get(id)
            .ok_or(DataStoreError::UnknownContactPoint(id))
    }

    /// Set the options of a contact point.
    pub fn set_cp_options(&mut self, id: CpId, options: CpOptions) -> Result<(), DataStoreError> {
        match self.contact_points.get_mut(id) {
            Some(cp) => {
                cp.set_options(options);
                Ok(())
            }
            None => Err(DataStoreError::UnknownContactPoint(id)),
        }
    }

    /// Transform a road position into a cartesian position on a contact
    /// point.
    pub fn eval_uv_to_xy(&mut self, id: CpId, u_m: f64, v_m: f64) -> Result<Xy, EvalError> {
        self.contact_point_mut(id)?.eval_uv_to_xy(u_m, v_m)
    }

    /// Calculate the heading and curvature at a road position on a contact
    /// point.
    pub fn eval_uv_to_pk(&mut self, id: CpId, u_m: f64, v_m: f64) -> Result<Pk, EvalError> {
        self.contact_point_mut(id)?.eval_uv_to_pk(u_m, v_m)
    }

    /// Transform a cartesian position into a road position on a contact
    /// point.
    pub fn eval_xy_to_uv(&mut self, id: CpId, x_m: f64, y_m: f64) -> Result<Uv, EvalError> {
        self.contact_point_mut(id)?.eval_xy_to_uv(x_m, y_m)
    }

    /// Calculate the heading and curvature at a cartesian position on a
    /// contact point.
    pub fn eval_xy_to_pk(&mut self, id: CpId, x_m: f64, y_m: f64) -> Result<Pk, EvalError> {
        self.contact_point_mut(id)?.eval_xy_to_pk(x_m, y_m)
    }

    fn data_set_arc(&self, id: DataSetId) -> Result<&Arc<ReferenceLine>, DataStoreError> {
        self.data_sets
            .get(id)
            .ok_or(DataStoreError::UnknownDataSet(id))
    }

    fn contact_point_mut(&mut self, id: CpId) -> Result<&mut ContactPoint, EvalError> {
        match self.contact_points.get_mut(id) {
            Some(cp) => Ok(cp),
            None => {
                warn!("Evaluation requested on unknown contact point {}", id);
                Err(EvalError::UnknownContactPoint(id))
            }
        }
    }
}

impl fmt::Display for DataSetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.data())
    }
}

impl fmt::Display for CpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.data())
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
