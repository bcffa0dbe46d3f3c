use common::Address;

pub fn to_revm_address(address: &Address) -> revm::primitives::Address {
    revm::primitives::Address::from_slice(address.as_bytes())
}

pub fn from_revm_address(address: &revm::primitives::Address) -> Address {
    Address::from_slice(address.as_slice())
}
