//! Request dispatch

use coatingtk::stack::{KEY_AOI, KEY_LAMBDA0, KEY_SUBSTRATE, KEY_SUPERSTRATE};
use coatingtk::{CoatingError, CoatingSession, LayerSpec, MaterialDef};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use tracing::debug;

const JSONRPC_VERSION: &str = "2.0";

pub const PARSE_ERROR: i32 = -32700;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;
/// Any `CoatingError`; the error itself travels in `data`
pub const APPLICATION_ERROR: i32 = -32000;

#[derive(Debug, Deserialize)]
pub struct Request {
    /// Absent for notifications
    #[serde(default)]
    pub id: Option<JsonValue>,
    pub method: String,
    #[serde(default)]
    pub params: Option<JsonValue>,
}

#[derive(Debug, Serialize)]
pub struct Response {
    pub jsonrpc: &'static str,
    pub id: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl Response {
    pub fn success(id: Option<JsonValue>, result: JsonValue) -> Self {
        Self { jsonrpc: JSONRPC_VERSION, id, result: Some(result), error: None }
    }

    pub fn failure(id: Option<JsonValue>, error: RpcError) -> Self {
        Self { jsonrpc: JSONRPC_VERSION, id, result: None, error: Some(error) }
    }
}

#[derive(Debug, Serialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonValue>,
}

impl RpcError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into(), data: None }
    }

    pub fn parse_error(details: impl std::fmt::Display) -> Self {
        Self::new(PARSE_ERROR, format!("Parse error: {}", details))
    }

    fn method_not_found(method: &str) -> Self {
        Self::new(METHOD_NOT_FOUND, format!("Method not found: {}", method))
    }

    fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(INVALID_PARAMS, message)
    }
}

impl From<CoatingError> for RpcError {
    fn from(err: CoatingError) -> Self {
        Self {
            code: APPLICATION_ERROR,
            message: err.message.clone(),
            data: serde_json::to_value(&err).ok(),
        }
    }
}

pub fn handle_request(session: &mut CoatingSession, request: &Request) -> Response {
    let params = request.params.clone().unwrap_or(JsonValue::Null);
    match dispatch(session, &request.method, &params) {
        Ok(result) => Response::success(request.id.clone(), result),
        Err(error) => {
            debug!(method = %request.method, code = error.code, message = %error.message, "request failed");
            Response::failure(request.id.clone(), error)
        }
    }
}

fn dispatch(session: &mut CoatingSession, method: &str, params: &JsonValue) -> Result<JsonValue, RpcError> {
    match method {
        // Plots and options
        "plots/list" => Ok(json!({
            "plots": session.plots(),
            "current": session.current_plot().ok(),
        })),
        "plots/select" => to_json(session.select_plot(str_param(params, "id")?)?),
        "options/get" => {
            let id = plot_id(session, params)?;
            to_json(session.option_panel(&id)?)
        }
        "options/edit" => {
            let id = plot_id(session, params)?;
            let key = str_param(params, "key")?;
            let value = session.edit_option(&id, key, &raw_param(params, "value")?)?;
            Ok(json!({ "key": key, "value": value }))
        }

        // Stack
        "stack/get" => stack_state(session),
        "stack/insert" => {
            let row = match params.get("row").filter(|v| !v.is_null()) {
                Some(_) => usize_param(params, "row")?,
                None => session.layers()?.len(),
            };
            let layer = LayerSpec::new(str_param(params, "material")?, f64_param(params, "thickness")?);
            session.insert_layer(row, layer)?;
            stack_state(session)
        }
        "stack/remove" => to_json(session.remove_layer(usize_param(params, "row")?)?),
        "stack/clear" => {
            session.clear_stack();
            stack_state(session)
        }
        "stack/material" => {
            session.set_layer_material(usize_param(params, "row")?, str_param(params, "material")?)?;
            stack_state(session)
        }
        "stack/thickness" => {
            let edit = session.set_layer_thickness(usize_param(params, "row")?, &raw_param(params, "text")?)?;
            to_json(edit)
        }
        "stack/superstrate" => {
            session.set_superstrate(str_param(params, "material")?)?;
            stack_state(session)
        }
        "stack/substrate" => {
            session.set_substrate(str_param(params, "material")?)?;
            stack_state(session)
        }
        "stack/lambda0" => Ok(json!({ "lambda0": session.set_lambda0(&raw_param(params, "value")?)? })),
        "stack/aoi" => Ok(json!({ "aoi": session.set_aoi(&raw_param(params, "value")?)? })),

        // Wizard
        "wizard/bilayers" => {
            let added = session.add_bilayers(
                usize_param(params, "count")?,
                str_param(params, "first")?,
                str_param(params, "second")?,
                bool_param_or(params, "half_wave_cap", false)?,
            )?;
            Ok(json!({ "added": added, "layers": session.layers()? }))
        }
        "wizard/shift" => {
            session.shift_stack(f64_param(params, "percent")?)?;
            stack_state(session)
        }

        // Materials
        "materials/list" => Ok(json!({ "materials": session.materials() })),
        "materials/register" => {
            let name = str_param(params, "name")?;
            let def: MaterialDef = serde_json::from_value(param(params, "material")?.clone())
                .map_err(|e| RpcError::invalid_params(format!("invalid material: {}", e)))?;
            let material = def.into_material(name).map_err(CoatingError::from)?;
            session.register_material(material)?;
            Ok(json!({ "materials": session.materials() }))
        }
        "materials/remove" => {
            session.unregister_material(str_param(params, "name")?)?;
            Ok(json!({ "materials": session.materials() }))
        }

        // Evaluation
        "evaluate" => {
            let id = plot_id(session, params)?;
            to_json(session.evaluate_plot(&id)?)
        }
        "export" => {
            let id = plot_id(session, params)?;
            let figure = session.evaluate_plot(&id)?;
            Ok(json!({ "text": session.export_data(&figure)? }))
        }
        "export/formula" => Ok(json!({ "text": session.export_formula()? })),
        "config/get" => Ok(json!({
            "config": session.config().to_json(),
            "modified": session.is_modified(),
        })),

        _ => Err(RpcError::method_not_found(method)),
    }
}

fn stack_state(session: &CoatingSession) -> Result<JsonValue, RpcError> {
    let config = session.config();
    Ok(json!({
        "superstrate": config.get(KEY_SUPERSTRATE),
        "substrate": config.get(KEY_SUBSTRATE),
        "lambda0": config.get(KEY_LAMBDA0),
        "aoi": config.get(KEY_AOI),
        "layers": session.layers()?,
    }))
}

fn to_json<T: Serialize>(value: T) -> Result<JsonValue, RpcError> {
    serde_json::to_value(value).map_err(|e| RpcError::new(INTERNAL_ERROR, e.to_string()))
}

// ========== Parameter helpers ==========

fn param<'a>(params: &'a JsonValue, name: &str) -> Result<&'a JsonValue, RpcError> {
    params
        .get(name)
        .filter(|v| !v.is_null())
        .ok_or_else(|| RpcError::invalid_params(format!("missing parameter '{}'", name)))
}

fn str_param<'a>(params: &'a JsonValue, name: &str) -> Result<&'a str, RpcError> {
    param(params, name)?
        .as_str()
        .ok_or_else(|| RpcError::invalid_params(format!("'{}' must be a string", name)))
}

fn usize_param(params: &JsonValue, name: &str) -> Result<usize, RpcError> {
    param(params, name)?
        .as_u64()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| RpcError::invalid_params(format!("'{}' must be a non-negative integer", name)))
}

fn f64_param(params: &JsonValue, name: &str) -> Result<f64, RpcError> {
    param(params, name)?
        .as_f64()
        .ok_or_else(|| RpcError::invalid_params(format!("'{}' must be a number", name)))
}

fn bool_param_or(params: &JsonValue, name: &str, default: bool) -> Result<bool, RpcError> {
    match params.get(name).filter(|v| !v.is_null()) {
        None => Ok(default),
        Some(v) => v
            .as_bool()
            .ok_or_else(|| RpcError::invalid_params(format!("'{}' must be a boolean", name))),
    }
}

/// Raw widget text; bare numbers are accepted as well
fn raw_param(params: &JsonValue, name: &str) -> Result<String, RpcError> {
    match param(params, name)? {
        JsonValue::String(s) => Ok(s.clone()),
        JsonValue::Number(n) => Ok(n.to_string()),
        _ => Err(RpcError::invalid_params(format!("'{}' must be a string or a number", name))),
    }
}

/// Explicit `id` parameter, else the current plot
fn plot_id(session: &CoatingSession, params: &JsonValue) -> Result<String, RpcError> {
    match params.get("id").and_then(JsonValue::as_str) {
        Some(id) => Ok(id.to_string()),
        None => Ok(session.current_plot()?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(session: &mut CoatingSession, line: &str) -> JsonValue {
        let request: Request = serde_json::from_str(line).unwrap();
        serde_json::to_value(handle_request(session, &request)).unwrap()
    }

    fn session() -> CoatingSession {
        CoatingSession::with_standard().unwrap()
    }

    #[test]
    fn test_plots_list() {
        let mut s = session();
        let response = call(&mut s, r#"{"id": 1, "method": "plots/list"}"#);
        assert_eq!(response["id"], 1);
        assert_eq!(response["jsonrpc"], "2.0");
        assert_eq!(response["result"]["plots"][0]["id"], "brownian_noise");
        assert_eq!(response["result"]["current"], "brownian_noise");
    }

    #[test]
    fn test_unknown_method() {
        let mut s = session();
        let response = call(&mut s, r#"{"id": 2, "method": "stack/explode"}"#);
        assert_eq!(response["error"]["code"], METHOD_NOT_FOUND);
        assert!(response.get("result").is_none());
    }

    #[test]
    fn test_coating_error_in_data() {
        let mut s = session();
        let response = call(&mut s, r#"{"id": 3, "method": "plots/select", "params": {"id": "nope"}}"#);
        assert_eq!(response["error"]["code"], APPLICATION_ERROR);
        assert_eq!(response["error"]["data"]["code"], "UNKNOWN_PLUGIN_ID");
        assert_eq!(response["error"]["data"]["severity"], "fatal");
    }

    #[test]
    fn test_missing_params() {
        let mut s = session();
        let response = call(&mut s, r#"{"id": 4, "method": "stack/remove"}"#);
        assert_eq!(response["error"]["code"], INVALID_PARAMS);
    }

    #[test]
    fn test_stack_round_trip() {
        let mut s = session();
        call(&mut s, r#"{"id": 1, "method": "stack/insert", "params": {"material": "Ta2O5", "thickness": 0}}"#);
        let response = call(&mut s, r#"{"id": 2, "method": "stack/thickness", "params": {"row": 0, "text": "*1"}}"#);
        assert_eq!(response["result"]["status"], "stored");
        let t = response["result"]["value"].as_f64().unwrap();
        assert!((t - 1064.0 / (4.0 * 2.09)).abs() < 1e-9);

        let response = call(&mut s, r#"{"id": 3, "method": "stack/lambda0", "params": {"value": 532}}"#);
        assert_eq!(response["result"]["lambda0"], 532.0);

        let response = call(&mut s, r#"{"id": 4, "method": "stack/get"}"#);
        assert_eq!(response["result"]["layers"][0]["material"], "Ta2O5");
        assert_eq!(response["result"]["substrate"], "SiO2");
    }

    #[test]
    fn test_evaluate_and_export() {
        let mut s = session();
        call(&mut s, r#"{"id": 1, "method": "options/edit", "params": {"key": "xaxis.steps", "value": "20"}}"#);
        let response = call(&mut s, r#"{"id": 2, "method": "evaluate"}"#);
        assert_eq!(response["result"]["series"][0]["x"].as_array().unwrap().len(), 20);
        assert_eq!(response["result"]["x_scale"], "log");

        let response = call(&mut s, r#"{"id": 3, "method": "export", "params": {"id": "index_profile"}}"#);
        assert!(response["result"]["text"].as_str().unwrap().starts_with("# Depth (nm)"));
    }

    #[test]
    fn test_export_formula() {
        let mut s = session();
        call(&mut s, r#"{"id": 1, "method": "stack/insert", "params": {"material": "1.5", "thickness": 177.33333333333334}}"#);
        let response = call(&mut s, r#"{"id": 2, "method": "export/formula"}"#);
        let text = response["result"]["text"].as_str().unwrap();
        assert!(text.contains("SiO2 | 0.25*1.5 | 1.0"), "{}", text);

        call(&mut s, r#"{"id": 3, "method": "stack/material", "params": {"row": 0, "material": "Nope"}}"#);
        let response = call(&mut s, r#"{"id": 4, "method": "export/formula"}"#);
        assert_eq!(response["error"]["data"]["code"], "MATERIAL_NOT_DEFINED");
    }

    #[test]
    fn test_register_material() {
        let mut s = session();
        let response = call(
            &mut s,
            r#"{"id": 1, "method": "materials/register", "params": {"name": "AlAs", "material": {"n": 2.9}}}"#,
        );
        let names = response["result"]["materials"].as_array().unwrap();
        assert!(names.iter().any(|n| n == "AlAs"));

        let response = call(&mut s, r#"{"id": 2, "method": "materials/register", "params": {"name": "Bad", "material": {}}}"#);
        assert_eq!(response["error"]["data"]["code"], "INVALID_VALUE");
    }

    #[test]
    fn test_config_get_tracks_modified() {
        let mut s = session();
        let response = call(&mut s, r#"{"id": 1, "method": "config/get"}"#);
        assert_eq!(response["result"]["modified"], false);
        assert_eq!(response["result"]["config"]["coating"]["lambda0"], 1064.0);

        call(&mut s, r#"{"id": 2, "method": "stack/aoi", "params": {"value": "10"}}"#);
        let response = call(&mut s, r#"{"id": 3, "method": "config/get"}"#);
        assert_eq!(response["result"]["modified"], true);
    }
}
