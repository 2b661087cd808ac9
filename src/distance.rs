use crate::error::{Error, Result};

/// 计算两个特征向量的欧氏距离，距离越小越相似
///
/// 两个向量长度必须一致，否则返回 [`Error::DimensionMismatch`]
pub fn euclidean(va: &[f64], vb: &[f64]) -> Result<f64> {
    if va.len() != vb.len() {
        return Err(Error::DimensionMismatch { expected: va.len(), got: vb.len() });
    }
    Ok(va.iter().zip(vb).map(|(a, b)| (a - b) * (a - b)).sum::<f64>().sqrt())
}
