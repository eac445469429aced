use pagecraft_editor::{
    DocumentChange, DragSource, DropCandidate, EditSession, EditorConfig, EditorError,
    EditorMode, InitialValue, Mutation, Selection, Viewport,
};
use pagecraft_model::section_templates;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn from_json<T: DeserializeOwned>(what: &str, json: &str) -> Result<T, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid {}: {}", what, e))
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization error: {}", e))
}

fn js_err(message: String) -> JsValue {
    JsValue::from_str(&message)
}

/// One editing session as seen from JavaScript.
///
/// Commands return `true` when they committed and `false` when they resolved
/// to a no-op; the reason of the last no-op is kept in `lastError`. Only
/// malformed JSON input is thrown.
#[wasm_bindgen]
pub struct EditorHandle {
    session: EditSession,
    changes: Rc<RefCell<Vec<DocumentChange>>>,
    last_error: Option<String>,
}

impl EditorHandle {
    fn create(config: Option<String>, initial: Option<String>) -> Result<Self, String> {
        let config = match config {
            Some(json) => EditorConfig::from_json(&json).map_err(|e| e.to_string())?,
            None => EditorConfig::default(),
        };
        let initial = initial
            .map(|json| from_json::<InitialValue>("initial document", &json))
            .transpose()?;

        let changes: Rc<RefCell<Vec<DocumentChange>>> = Rc::default();
        let mut session = EditSession::load(config, initial);
        let sink = Rc::clone(&changes);
        session.on_change(move |change: DocumentChange| sink.borrow_mut().push(change));

        Ok(Self {
            session,
            changes,
            last_error: None,
        })
    }

    fn outcome(&mut self, result: Result<(), EditorError>) -> bool {
        match result {
            Ok(()) => {
                self.last_error = None;
                true
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                false
            }
        }
    }

    fn apply_json(&mut self, json: &str) -> Result<bool, String> {
        let mutation: Mutation = from_json("mutation", json)?;
        let result = self.session.apply(mutation);
        Ok(self.outcome(result))
    }

    fn select_json(&mut self, json: &str) -> Result<bool, String> {
        let selection: Selection = from_json("selection", json)?;
        let result = self.session.select(selection);
        Ok(self.outcome(result))
    }

    fn set_viewport_name(&mut self, name: &str) -> Result<(), String> {
        let viewport: Viewport = serde_json::from_value(serde_json::Value::String(name.to_string()))
            .map_err(|_| format!("Unknown viewport: {}", name))?;
        self.session.set_viewport(viewport);
        Ok(())
    }

    fn begin_drag_json(&mut self, source: &str, timestamp: f64) -> Result<bool, String> {
        let source: DragSource = from_json("drag source", source)?;
        let result = self.session.begin_drag(source, timestamp as u64);
        Ok(self.outcome(result))
    }

    fn drag_over_json(&mut self, candidates: &str) -> Result<Option<String>, String> {
        let candidates: Vec<DropCandidate> = from_json("drop candidates", candidates)?;
        Ok(self
            .session
            .drag_over(&candidates)
            .map(|target| target.id().to_string()))
    }

    fn drop_json(&mut self, candidates: &str, timestamp: f64) -> Result<bool, String> {
        let candidates: Vec<DropCandidate> = from_json("drop candidates", candidates)?;
        let result = self.session.drop(&candidates, timestamp as u64);
        Ok(self.outcome(result))
    }

    fn take_changes_json(&mut self) -> Result<String, String> {
        let changes = std::mem::take(&mut *self.changes.borrow_mut());
        to_json(&changes)
    }
}

#[wasm_bindgen]
impl EditorHandle {
    /// `config` is an editor config JSON object; `initial` is either
    /// `{ "sections": [...] }` or a legacy `{ "widgets": [...] }` page
    #[wasm_bindgen(constructor)]
    pub fn new(config: Option<String>, initial: Option<String>) -> Result<EditorHandle, JsValue> {
        Self::create(config, initial).map_err(js_err)
    }

    /// Apply a mutation given as JSON (`{ "type": "addSection", ... }`)
    #[wasm_bindgen(js_name = apply)]
    pub fn apply_js(&mut self, mutation: &str) -> Result<bool, JsValue> {
        self.apply_json(mutation).map_err(js_err)
    }

    pub fn undo(&mut self) -> bool {
        let result = self.session.undo();
        self.outcome(result)
    }

    pub fn redo(&mut self) -> bool {
        let result = self.session.redo();
        self.outcome(result)
    }

    #[wasm_bindgen(getter = canUndo)]
    pub fn can_undo(&self) -> bool {
        self.session.can_undo()
    }

    #[wasm_bindgen(getter = canRedo)]
    pub fn can_redo(&self) -> bool {
        self.session.can_redo()
    }

    #[wasm_bindgen(js_name = beginBatch)]
    pub fn begin_batch(&mut self, label: &str) {
        self.session.begin_batch(label);
    }

    #[wasm_bindgen(js_name = endBatch)]
    pub fn end_batch(&mut self) -> bool {
        self.session.end_batch()
    }

    #[wasm_bindgen(js_name = select)]
    pub fn select_js(&mut self, selection: &str) -> Result<bool, JsValue> {
        self.select_json(selection).map_err(js_err)
    }

    #[wasm_bindgen(getter)]
    pub fn selection(&self) -> Result<String, JsValue> {
        to_json(self.session.selection()).map_err(js_err)
    }

    #[wasm_bindgen(js_name = setViewport)]
    pub fn set_viewport(&mut self, viewport: &str) -> Result<(), JsValue> {
        self.set_viewport_name(viewport).map_err(js_err)
    }

    #[wasm_bindgen(js_name = setPreview)]
    pub fn set_preview(&mut self, preview: bool) {
        let mode = if preview {
            EditorMode::Preview
        } else {
            EditorMode::Edit
        };
        self.session.set_mode(mode);
    }

    #[wasm_bindgen(js_name = beginDrag)]
    pub fn begin_drag(&mut self, source: &str, timestamp: f64) -> Result<bool, JsValue> {
        self.begin_drag_json(source, timestamp).map_err(js_err)
    }

    /// Id of the candidate the pointer would drop on, if any
    #[wasm_bindgen(js_name = dragOver)]
    pub fn drag_over(&mut self, candidates: &str) -> Result<Option<String>, JsValue> {
        self.drag_over_json(candidates).map_err(js_err)
    }

    #[wasm_bindgen(js_name = drop)]
    pub fn drop_js(&mut self, candidates: &str, timestamp: f64) -> Result<bool, JsValue> {
        self.drop_json(candidates, timestamp).map_err(js_err)
    }

    #[wasm_bindgen(js_name = cancelDrag)]
    pub fn cancel_drag(&mut self) -> bool {
        self.session.cancel_drag()
    }

    #[wasm_bindgen(getter)]
    pub fn version(&self) -> f64 {
        self.session.version() as f64
    }

    #[wasm_bindgen(getter = lastError)]
    pub fn last_error(&self) -> Option<String> {
        self.last_error.clone()
    }

    /// The live document as JSON
    pub fn document(&self) -> Result<String, JsValue> {
        to_json(self.session.document()).map_err(js_err)
    }

    /// The page as rendered at the active viewport
    pub fn view(&mut self) -> Result<String, JsValue> {
        to_json(self.session.view()).map_err(js_err)
    }

    /// Committed documents since the last call, oldest first
    #[wasm_bindgen(js_name = takeChanges)]
    pub fn take_changes(&mut self) -> Result<String, JsValue> {
        self.take_changes_json().map_err(js_err)
    }

    /// Widget palette
    pub fn catalog(&self) -> Result<String, JsValue> {
        to_json(self.session.catalog().definitions()).map_err(js_err)
    }

    #[wasm_bindgen(js_name = sectionTemplates)]
    pub fn section_templates(&self) -> Result<String, JsValue> {
        to_json(&section_templates()).map_err(js_err)
    }
}
