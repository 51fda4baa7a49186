use burn::tensor::{backend::Backend, Data, ElementConversion, Int, Shape, Tensor};

use crate::pipelines::sentiment_analysis::Features;

/// Scatter sparse feature vectors into a dense `[rows, width]` matrix
pub fn densify<B: Backend>(rows: &[Features], width: usize, device: &B::Device) -> Tensor<B, 2> {
    let mut values = vec![0.0f32; rows.len() * width];

    for (row, features) in rows.iter().enumerate() {
        for (&column, &value) in features.indices.iter().zip(&features.values) {
            // Indices past the width belong to a different vocabulary
            if column < width {
                values[row * width + column] = value;
            }
        }
    }

    Tensor::from_data(
        Data::new(values, Shape::new([rows.len(), width])).convert::<B::FloatElem>(),
        device,
    )
}

/// Build a 1D tensor of class ids
pub fn class_ids<B: Backend>(ids: &[usize], device: &B::Device) -> Tensor<B, 1, Int> {
    let values: Vec<B::IntElem> = ids.iter().map(|id| (*id as i64).elem()).collect();

    Tensor::from_data(Data::new(values, Shape::new([ids.len()])), device)
}

/// Copy a float tensor back into a flat, row-major vector
pub fn to_vec<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> Vec<f32> {
    tensor.into_data().convert::<f32>().value
}
