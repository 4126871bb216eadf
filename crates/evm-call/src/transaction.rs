use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_rlp::{Encodable, RlpEncodable};
use sha3::{Digest, Keccak256};

use crate::address::parse_address;
use crate::error::TransactionError;

/// Fields of an unsigned EIP-1559 (type 2) transaction.
///
/// Signing happens in the wallet; this type only produces the bytes a wallet
/// signs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eip1559Request {
    pub chain_id: u64,
    pub nonce: u64,
    pub max_priority_fee_per_gas: u128,
    pub max_fee_per_gas: u128,
    pub gas_limit: u64,
    /// Recipient contract as a 0x-prefixed hex string.
    pub to: String,
    /// Native value in wei.
    pub value: u128,
    pub data: Vec<u8>,
}

impl Eip1559Request {
    /// Encodes the unsigned transaction as `0x02 || rlp(fields)`.
    ///
    /// The RLP-encoded fields are:
    /// `[chain_id, nonce, max_priority_fee_per_gas, max_fee_per_gas, gas_limit, to,
    ///   value, data, access_list]`
    pub fn encode_unsigned(&self) -> Result<Vec<u8>, TransactionError> {
        let fields = UnsignedTxFields {
            chain_id: self.chain_id,
            nonce: self.nonce,
            max_priority_fee_per_gas: self.max_priority_fee_per_gas,
            max_fee_per_gas: self.max_fee_per_gas,
            gas_limit: self.gas_limit,
            to: parse_address(&self.to)?,
            value: U256::from(self.value),
            data: Bytes::copy_from_slice(&self.data),
            access_list: Vec::new(),
        };

        let mut rlp_buf = Vec::with_capacity(fields.length());
        fields.encode(&mut rlp_buf);

        let mut payload = Vec::with_capacity(1 + rlp_buf.len());
        payload.push(0x02); // EIP-1559 type byte.
        payload.extend_from_slice(&rlp_buf);
        Ok(payload)
    }

    /// Keccak-256 of [`Self::encode_unsigned`]; the digest a wallet signs.
    pub fn signing_hash(&self) -> Result<[u8; 32], TransactionError> {
        let payload = self.encode_unsigned()?;
        Ok(Keccak256::digest(&payload).into())
    }
}

#[derive(RlpEncodable)]
struct UnsignedTxFields {
    chain_id: u64,
    nonce: u64,
    max_priority_fee_per_gas: u128,
    max_fee_per_gas: u128,
    gas_limit: u64,
    to: Address,
    value: U256,
    data: Bytes,
    access_list: Vec<AccessListItem>,
}

/// An EIP-2930 access list entry. Requests always carry an empty list.
#[derive(Debug, Clone, RlpEncodable)]
struct AccessListItem {
    address: Address,
    storage_keys: Vec<B256>,
}
