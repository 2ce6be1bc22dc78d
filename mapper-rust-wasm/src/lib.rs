use wasm_bindgen::prelude::*;
use mapper_core::{ElementKind, FieldStore, GridTopology, MappingKind, RasterGrid, map};

#[wasm_bindgen]
pub struct RasterMapper {
    grid: RasterGrid,
    fields: FieldStore,
}

#[wasm_bindgen]
impl RasterMapper {
    #[wasm_bindgen(constructor)]
    pub fn new(rows: usize, cols: usize, spacing: f64) -> Result<RasterMapper, JsValue> {
        let grid = RasterGrid::with_spacing(rows, cols, spacing).map_err(to_js)?;
        let fields = FieldStore::new(&grid);
        Ok(RasterMapper { grid, fields })
    }

    // Shape
    pub fn rows(&self) -> usize { self.grid.num_rows() }
    pub fn cols(&self) -> usize { self.grid.num_cols() }
    pub fn node_count(&self) -> usize { self.grid.node_count() }
    pub fn link_count(&self) -> usize { self.grid.link_count() }
    pub fn cell_count(&self) -> usize { self.grid.cell_count() }

    // Fields
    pub fn set_node_field(&mut self, name: &str, values: Vec<f64>) -> Result<(), JsValue> {
        self.fields.add_field(ElementKind::Node, name, values).map_err(to_js)
    }

    pub fn has_field(&self, at: &str, name: &str) -> Result<bool, JsValue> {
        let kind: ElementKind = at.parse().map_err(|e: String| JsValue::from_str(&e))?;
        Ok(self.fields.has_field(kind, name))
    }

    // Copy-based JS access (reliable)
    pub fn get_field(&self, at: &str, name: &str) -> Result<Vec<f64>, JsValue> {
        let kind: ElementKind = at.parse().map_err(|e: String| JsValue::from_str(&e))?;
        self.fields.require(kind, name).map(|v| v.to_vec()).map_err(to_js)
    }

    /// Run one mapping ("tail", "head", "mean", "max", "min", "cell") with timing.
    pub fn map_field(&mut self, mapping: &str, name_in: &str, name_out: &str) -> Result<MapInfo, JsValue> {
        let kind: MappingKind = mapping.parse().map_err(|e: String| JsValue::from_str(&e))?;
        let t0 = now_ms();
        let element_count = map(kind, &self.grid, &mut self.fields, name_in, name_out)
            .map_err(to_js)?
            .len();
        let t1 = now_ms();
        Ok(MapInfo { element_count, compute_ms: t1 - t0 })
    }
}

#[wasm_bindgen]
pub struct MapInfo {
    element_count: usize,
    compute_ms: f64,
}

#[wasm_bindgen]
impl MapInfo {
    pub fn element_count(&self) -> usize { self.element_count }
    pub fn compute_ms(&self) -> f64 { self.compute_ms }
}


fn to_js(e: mapper_core::MapperError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}
