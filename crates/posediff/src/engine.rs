//! The reconciliation engine: single owner of records, visibility, scene and
//! selection.

use glam::Vec2;
use posediff_core::{
    decompose, CameraRecord, CoordinateSystem, Options, PickResult, PoseDiff, PoseDiffError,
    Result, ValidationFinding, Visibility,
};
use posediff_scene::{picking, PoseMarker, RebuildSummary, SceneRegistry, ViewCamera};

use crate::report::ReportSnapshot;
use crate::source::DataSource;

/// Lifecycle state of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineState {
    /// No records have been set, or the engine was disposed.
    #[default]
    Uninitialized,
    /// Records are loaded and the scene reflects them.
    Loaded,
}

/// The currently selected camera.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Snapshot of the selected record.
    pub record: CameraRecord,
    /// Which marker was clicked; `None` for programmatic selection.
    pub picked: Option<CoordinateSystem>,
}

/// Reconciles reference and candidate poses for one session.
///
/// Every mutation that affects the scene rebuilds it synchronously before
/// returning, so the marker list is always a function of the current records
/// and visibility.
#[derive(Debug)]
pub struct ReconciliationEngine {
    options: Options,
    state: EngineState,
    records: Vec<CameraRecord>,
    visibility: Visibility,
    scene: SceneRegistry,
    camera: ViewCamera,
    selection: Option<Selection>,
    validation_results: Vec<ValidationFinding>,
}

impl Default for ReconciliationEngine {
    fn default() -> Self {
        Self::new(Options::default())
    }
}

impl ReconciliationEngine {
    /// Creates an engine with no records.
    pub fn new(options: Options) -> Self {
        let scene = SceneRegistry::new(&options.marker);
        let camera = ViewCamera::from_options(&options.view);
        Self {
            options,
            state: EngineState::Uninitialized,
            records: Vec::new(),
            visibility: Visibility::default(),
            scene,
            camera,
            selection: None,
            validation_results: Vec::new(),
        }
    }

    /// Returns the configuration.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Returns the lifecycle state.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Returns the loaded records.
    pub fn records(&self) -> &[CameraRecord] {
        &self.records
    }

    /// Finds a record by its `file_path`.
    pub fn record(&self, file_path: &str) -> Option<&CameraRecord> {
        self.records.iter().find(|r| r.file_path == file_path)
    }

    /// Replaces the records and rebuilds the scene.
    ///
    /// A selection survives: if its camera is still present the snapshot is
    /// refreshed from the new record, otherwise it is kept as is.
    pub fn set_records(&mut self, records: Vec<CameraRecord>) -> RebuildSummary {
        self.records = records;
        self.state = EngineState::Loaded;

        if let Some(selection) = self.selection.as_mut() {
            if let Some(fresh) = self
                .records
                .iter()
                .find(|r| r.file_path == selection.record.file_path)
            {
                selection.record = fresh.clone();
            }
        }

        self.rebuild()
    }

    /// Returns the visibility flags.
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Shows or hides one coordinate system and rebuilds the scene.
    pub fn set_visibility(&mut self, system: CoordinateSystem, visible: bool) -> RebuildSummary {
        self.visibility.set(system, visible);
        log::debug!("{system} markers {}", if visible { "shown" } else { "hidden" });
        self.rebuild()
    }

    /// Flips the visibility of one coordinate system; returns the new value.
    pub fn toggle_visibility(&mut self, system: CoordinateSystem) -> bool {
        let visible = !self.visibility.is_visible(system);
        self.set_visibility(system, visible);
        visible
    }

    fn rebuild(&mut self) -> RebuildSummary {
        self.scene.rebuild(&self.records, self.visibility)
    }

    /// Returns the live markers.
    pub fn markers(&self) -> &[PoseMarker] {
        self.scene.markers()
    }

    /// Returns the scene registry.
    pub fn scene(&self) -> &SceneRegistry {
        &self.scene
    }

    /// Picks the marker under a pointer given in NDC.
    ///
    /// A hit selects its camera and records which system was clicked. A miss
    /// leaves the selection untouched.
    pub fn handle_pointer(&mut self, ndc: Vec2) -> Option<PickResult> {
        let Some(hit) = picking::pick(ndc, &self.camera, self.scene.markers()) else {
            log::debug!("pointer at ({:.3}, {:.3}) hit nothing", ndc.x, ndc.y);
            return None;
        };

        if let Some(record) = self.record(&hit.camera_id).cloned() {
            log::info!("selected {} ({} marker)", record.file_path, hit.coordinate_system);
            self.selection = Some(Selection {
                record,
                picked: Some(hit.coordinate_system),
            });
        }
        Some(hit)
    }

    /// Picks at a pixel position inside a `width` x `height` viewport.
    pub fn handle_click(&mut self, pixel: Vec2, width: u32, height: u32) -> Option<PickResult> {
        let ndc = picking::pixel_to_ndc(pixel, width, height)?;
        self.handle_pointer(ndc)
    }

    /// Selects a camera by `file_path`.
    pub fn select(&mut self, file_path: &str) -> Result<&Selection> {
        if self.state != EngineState::Loaded {
            return Err(PoseDiffError::NotLoaded);
        }
        let record = self
            .record(file_path)
            .cloned()
            .ok_or_else(|| PoseDiffError::CameraNotFound(file_path.to_string()))?;
        log::info!("selected {file_path}");
        Ok(&*self.selection.insert(Selection {
            record,
            picked: None,
        }))
    }

    /// Returns the current selection.
    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Computes the difference between a record's reference and candidate poses.
    ///
    /// Returns `None` if either transform is absent or cannot be decomposed.
    pub fn compute_diff(record: &CameraRecord) -> Option<PoseDiff> {
        let reference = record.colmap_transform.as_ref()?;
        let candidate = record.transform_matrix.as_ref()?;
        match (decompose(reference), decompose(candidate)) {
            (Ok(reference), Ok(candidate)) => Some(PoseDiff::between(&reference, &candidate)),
            (Err(e), _) | (_, Err(e)) => {
                log::warn!("no diff for {}: {e}", record.file_path);
                None
            }
        }
    }

    /// Computes the difference for the selected camera.
    pub fn selected_diff(&self) -> Option<PoseDiff> {
        self.selection
            .as_ref()
            .and_then(|s| Self::compute_diff(&s.record))
    }

    /// Advances view animation by one frame; returns whether the view moved.
    pub fn frame_tick(&mut self) -> bool {
        self.camera.update()
    }

    /// Updates the view for a new viewport size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.resize(width, height);
    }

    /// Queues a damped orbit of the view camera.
    pub fn orbit(&mut self, delta_x: f32, delta_y: f32) {
        self.camera.rotate(delta_x, delta_y);
    }

    /// Pans the view camera.
    pub fn pan(&mut self, delta_x: f32, delta_y: f32) {
        self.camera.pan(delta_x, delta_y);
    }

    /// Zooms the view camera.
    pub fn zoom(&mut self, delta: f32) {
        self.camera.zoom(delta);
    }

    /// Frames all markers; returns `false` when the scene is empty.
    pub fn fit_view_to_scene(&mut self) -> bool {
        match self.scene.bounding_box() {
            Some((min, max)) => {
                self.camera.look_at_box(min, max);
                true
            }
            None => false,
        }
    }

    /// Returns the view camera.
    pub fn view_camera(&self) -> &ViewCamera {
        &self.camera
    }

    /// Returns the view camera mutably.
    pub fn view_camera_mut(&mut self) -> &mut ViewCamera {
        &mut self.camera
    }

    /// Applies a completed camera fetch.
    ///
    /// On failure the error is logged and returned, and no state changes.
    pub fn apply_cameras(&mut self, fetched: Result<Vec<CameraRecord>>) -> Result<RebuildSummary> {
        match fetched {
            Ok(records) => {
                log::info!("loaded {} cameras", records.len());
                Ok(self.set_records(records))
            }
            Err(e) => {
                log::error!("failed to load cameras: {e}");
                Err(e)
            }
        }
    }

    /// Applies a completed validation fetch; returns the number of findings.
    ///
    /// On failure the error is logged and returned, and no state changes.
    pub fn apply_validation(&mut self, fetched: Result<Vec<ValidationFinding>>) -> Result<usize> {
        match fetched {
            Ok(results) => {
                log::info!("loaded {} validation findings", results.len());
                self.validation_results = results;
                Ok(self.validation_results.len())
            }
            Err(e) => {
                log::error!("failed to load validation results: {e}");
                Err(e)
            }
        }
    }

    /// Fetches cameras from a data source and applies them.
    pub fn load_cameras<S: DataSource + ?Sized>(&mut self, source: &S) -> Result<RebuildSummary> {
        self.apply_cameras(source.fetch_cameras())
    }

    /// Fetches validation findings from a data source and applies them.
    pub fn load_validation<S: DataSource + ?Sized>(&mut self, source: &S) -> Result<usize> {
        self.apply_validation(source.fetch_validation_results())
    }

    /// Returns the loaded validation findings.
    pub fn validation_results(&self) -> &[ValidationFinding] {
        &self.validation_results
    }

    /// Returns the image URL of the selected camera.
    pub fn selected_image_url<S: DataSource + ?Sized>(&self, source: &S) -> Option<String> {
        self.selection
            .as_ref()
            .map(|s| source.image_url_for(&s.record.file_path))
    }

    /// Captures the data for report export.
    pub fn report_snapshot(&self) -> ReportSnapshot {
        ReportSnapshot::new(
            self.options.report_title.clone(),
            chrono::Utc::now(),
            self.records.len(),
            self.validation_results.clone(),
        )
    }

    /// Drops all records, markers, selection and findings.
    pub fn dispose(&mut self) {
        self.scene.clear();
        self.records.clear();
        self.selection = None;
        self.validation_results.clear();
        self.state = EngineState::Uninitialized;
        log::info!("engine disposed");
    }
}
