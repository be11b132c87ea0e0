//! Application use cases: the persistence API over the SQLite store.

mod branch;
mod common;
mod inventory;
mod invoice;
mod product;
mod purchase;
mod waste;

pub use branch::{
    branch_create, branch_delete, branch_find_by_name, branch_get, branch_list, branch_search,
    branch_update, BranchCreateReq, BranchDto, BranchUpdateReq,
};
pub use inventory::{
    inventory_delete, inventory_get, inventory_get_by_product_branch_month,
    inventory_get_with_details, inventory_list, inventory_upsert, InventoryDetailDto,
    InventoryDto, InventoryListReq, InventoryUpsertReq,
};
pub use invoice::{
    invoice_create, invoice_delete, invoice_get, invoice_list, invoice_update, InvoiceCreateReq,
    InvoiceDto, InvoiceUpdateReq,
};
pub use product::{
    product_create, product_delete, product_find_by_name, product_get, product_list,
    product_search, product_update, ProductCreateReq, ProductDto, ProductUpdateReq,
};
pub use purchase::{
    purchase_create, purchase_delete, purchase_get, purchase_list, purchase_update,
    PurchaseCreateReq, PurchaseDto, PurchaseUpdateReq,
};
pub use waste::{
    waste_create, waste_delete, waste_get, waste_list, waste_update, WasteCreateReq, WasteDto,
    WasteUpdateReq,
};
