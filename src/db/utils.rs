use byteorder::{ByteOrder, LittleEndian};

use crate::error::{Error, Result};

/// 将特征向量编码为小端序的 f64 数组，长度为 8 * 维数
pub fn encode_embedding(embedding: &[f64]) -> Vec<u8> {
    let mut bytes = vec![0u8; embedding.len() * 8];
    LittleEndian::write_f64_into(embedding, &mut bytes);
    bytes
}

/// 从字节中解码特征向量
pub fn decode_embedding(bytes: &[u8]) -> Result<Vec<f64>> {
    if bytes.len() % 8 != 0 {
        return Err(Error::Encoding(bytes.len()));
    }
    let mut embedding = vec![0f64; bytes.len() / 8];
    LittleEndian::read_f64_into(bytes, &mut embedding);
    Ok(embedding)
}
