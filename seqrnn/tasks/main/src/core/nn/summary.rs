use crate::api::traits::SequenceModel;

/// Human-readable listing of a model's parameters and memory footprint.
///
/// One line per parameter (`name [rows x cols]`), then the total count and
/// the `f32` memory estimate.
pub fn model_summary(model: &dyn SequenceModel) -> String {
    let params = model.parameters();

    let mut out = String::new();
    out.push_str("===== Model Summary =====\n");
    for (name, p) in &params {
        out.push_str(&format!("{name:<18} [{} x {}]\n", p.rows(), p.cols()));
    }

    let total_params: usize = params.iter().map(|(_, p)| p.numel()).sum();
    let memory_bytes = total_params * std::mem::size_of::<f32>();
    out.push_str(&format!("Total parameters:  {total_params}\n"));
    out.push_str(&format!("Memory estimate:   {} bytes", memory_bytes));

    if memory_bytes >= 1024 * 1024 {
        let mb = memory_bytes as f64 / (1024.0 * 1024.0);
        out.push_str(&format!(" ({mb:.2} MB)"));
    } else if memory_bytes >= 1024 {
        let kb = memory_bytes as f64 / 1024.0;
        out.push_str(&format!(" ({kb:.2} KB)"));
    }

    out.push('\n');
    out.push_str("=========================");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{InputInit, Nonlinearity, RecurrentInit};
    use crate::core::nn::elman::{ModelSpec, RecurrentModel};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn summary_small_model() {
        let spec = ModelSpec {
            input_size: 10,
            hidden_size: 4,
            num_classes: 9,
            nonlin: Nonlinearity::Tanh,
            rinit: RecurrentInit::Cayley,
            iinit: InputInit::Kaiming,
        };
        let model = RecurrentModel::new(&mut StdRng::seed_from_u64(0), &spec).unwrap();
        let summary = model_summary(&model);

        // 40 + 16 + 4 + 36 + 9 = 105 params, 420 bytes
        assert!(summary.contains("recurrent_weight   [4 x 4]"), "{summary}");
        assert!(summary.contains("Total parameters:  105"), "{summary}");
        assert!(summary.contains("420 bytes"), "{summary}");
    }
}
