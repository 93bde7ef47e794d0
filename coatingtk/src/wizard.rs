//! Stack generation helpers

use coatingtk_core::{CoatingError, LayerSpec, Material};

/// Physical thickness of one quarter wave of `material` at `lambda0`
pub fn quarter_wave(material: &dyn Material, lambda0: f64) -> Result<f64, CoatingError> {
    let n = material.n(lambda0);
    if !(n > 0.0 && n.is_finite()) {
        return Err(CoatingError::invalid_value(material.name(), &n.to_string(), "a refractive index > 0"));
    }
    Ok(lambda0 / (4.0 * n))
}

/// `count` quarter-wave pairs of `first` then `second`, optionally topped
/// with a half-wave layer of `first`
pub fn bilayers(
    count: usize,
    first: &dyn Material,
    second: &dyn Material,
    lambda0: f64,
    half_wave_cap: bool,
) -> Result<Vec<LayerSpec>, CoatingError> {
    if count == 0 {
        return Err(CoatingError::invalid_value("wizard.bilayers", "0", "at least one bilayer"));
    }
    let t1 = quarter_wave(first, lambda0)?;
    let t2 = quarter_wave(second, lambda0)?;

    let mut layers = Vec::with_capacity(2 * count + 1);
    for _ in 0..count {
        layers.push(LayerSpec::new(first.name(), t1));
        layers.push(LayerSpec::new(second.name(), t2));
    }
    if half_wave_cap {
        layers.push(LayerSpec::new(first.name(), 2.0 * t1));
    }
    Ok(layers)
}

/// Scale every thickness by `1 + percent / 100`
pub fn shift(layers: &mut [LayerSpec], percent: f64) -> Result<(), CoatingError> {
    if !(percent > -100.0 && percent.is_finite()) {
        return Err(CoatingError::invalid_value("wizard.shift", &percent.to_string(), "a percentage > -100"));
    }
    let factor = 1.0 + percent / 100.0;
    for layer in layers.iter_mut() {
        layer.thickness *= factor;
    }
    Ok(())
}
