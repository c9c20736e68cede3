use aes::{Aes128, Aes192, Aes256};
use aes::cipher::{generic_array::GenericArray, BlockDecrypt, KeyInit};

const BLOCK_SIZE: usize = 16;

fn decrypt_blocks<C: BlockDecrypt>(cipher: &C, data: &mut [u8]) {
    for block in data.chunks_exact_mut(BLOCK_SIZE) {
        cipher.decrypt_block(GenericArray::from_mut_slice(block));
    }
}

/// AES-ECB decryption, key size picked from the key length. A trailing
/// partial block is passed through unchanged.
pub fn decrypt_aes_ecb(key: &[u8], encrypted_data: &[u8]) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let mut data = encrypted_data.to_vec();
    let bad_key = |_| format!("Invalid AES key length {}!", key.len());
    match key.len() {
        16 => decrypt_blocks(&Aes128::new_from_slice(key).map_err(bad_key)?, &mut data),
        24 => decrypt_blocks(&Aes192::new_from_slice(key).map_err(bad_key)?, &mut data),
        32 => decrypt_blocks(&Aes256::new_from_slice(key).map_err(bad_key)?, &mut data),
        n => return Err(format!("Invalid AES key length {}!", n).into()),
    }
    Ok(data)
}

#[cfg(test)]
pub fn encrypt_aes_ecb(key: &[u8], plain_data: &[u8]) -> Vec<u8> {
    use aes::cipher::BlockEncrypt;
    let cipher = Aes128::new_from_slice(key).unwrap();
    let mut data = plain_data.to_vec();
    for block in data.chunks_exact_mut(BLOCK_SIZE) {
        cipher.encrypt_block(GenericArray::from_mut_slice(block));
    }
    data
}
