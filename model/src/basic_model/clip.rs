use candle_core::{backprop::GradStore, Result, Var};

/// Rescales all gradients together so their global L2 norm is at most
/// `max_norm`. A non-positive `max_norm` disables clipping.
pub fn clip_gradients(grads: &mut GradStore, vars: &[Var], max_norm: f64) -> Result<()> {
    if max_norm <= 0.0 {
        return Ok(());
    }
    let mut total_norm_sq = 0.0f64;
    for var in vars {
        if let Some(grad) = grads.get(var.as_tensor()) {
            total_norm_sq += f64::from(grad.sqr()?.sum_all()?.to_scalar::<f32>()?);
        }
    }
    let total_norm = total_norm_sq.sqrt();
    if total_norm <= max_norm {
        return Ok(());
    }
    let scale = max_norm / (total_norm + 1e-6);
    for var in vars {
        if let Some(grad) = grads.get(var.as_tensor()) {
            let clipped = (grad * scale)?;
            grads.insert(var.as_tensor(), clipped);
        }
    }
    Ok(())
}
