//! Typed field data per layout
//!
//! Every field is optional on the wire: missing fields fall back to an empty
//! value and fields not listed here are kept in `extra`.

use fmbrowse_core::FieldValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Unlisted fields, passed through unchanged
pub type ExtraFields = BTreeMap<String, serde_json::Value>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactFields {
    #[serde(rename = "USSMID")]
    pub ussm_id: FieldValue,
    #[serde(rename = "ContactName")]
    pub contact_name: FieldValue,
    #[serde(rename = "ContactType")]
    pub contact_type: FieldValue,
    #[serde(rename = "SalesContactName")]
    pub sales_contact_name: FieldValue,
    #[serde(rename = "SalesContactPhone")]
    pub sales_contact_phone: FieldValue,
    #[serde(rename = "SalesContactEmail")]
    pub sales_contact_email: FieldValue,
    #[serde(rename = "LastSalesDate")]
    pub last_sales_date: FieldValue,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductFields {
    #[serde(rename = "ItemNo")]
    pub item_no: FieldValue,
    #[serde(rename = "ProductName")]
    pub product_name: FieldValue,
    #[serde(rename = "ProductCategory")]
    pub product_category: FieldValue,
    #[serde(rename = "ProductCost_c")]
    pub product_cost: FieldValue,
    #[serde(rename = "CurrentInventory_w")]
    pub current_inventory: FieldValue,
    #[serde(rename = "UnitType")]
    pub unit_type: FieldValue,
    #[serde(rename = "DefaultPackSize")]
    pub default_pack_size: FieldValue,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// Inventory lot of a product
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LotFields {
    #[serde(rename = "ItemNo")]
    pub item_no: FieldValue,
    #[serde(rename = "SerialNo")]
    pub serial_no: FieldValue,
    #[serde(rename = "WarehouseName")]
    pub warehouse_name: FieldValue,
    #[serde(rename = "MfgDate")]
    pub mfg_date: FieldValue,
    #[serde(rename = "ExpDate")]
    pub exp_date: FieldValue,
    #[serde(rename = "LotNo_QtyAll")]
    pub qty_all: FieldValue,
    #[serde(rename = "LotNo_QtyUsed")]
    pub qty_used: FieldValue,
    #[serde(rename = "LotNo_QtyTransferOut")]
    pub qty_transfer_out: FieldValue,
    #[serde(rename = "LotNo_QtyTransferIn")]
    pub qty_transfer_in: FieldValue,
    #[serde(rename = "LotNo_CurrentInventory_Static")]
    pub current_inventory: FieldValue,
    #[serde(rename = "INVTransferStatus")]
    pub transfer_status: FieldValue,
    #[serde(rename = "Cost")]
    pub cost: FieldValue,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaleFields {
    #[serde(rename = "SalesKey_Display")]
    pub sales_key: FieldValue,
    #[serde(rename = "SalesStatus_new")]
    pub status: FieldValue,
    #[serde(rename = "SalesDate")]
    pub sales_date: FieldValue,
    #[serde(rename = "UssmID")]
    pub ussm_id: FieldValue,
    #[serde(rename = "ContactName_BillTo")]
    pub bill_to: FieldValue,
    #[serde(rename = "InvoiceNo")]
    pub invoice_no: FieldValue,
    #[serde(rename = "Total_Static_Display")]
    pub total: FieldValue,
    #[serde(rename = "InvoiceDate")]
    pub invoice_date: FieldValue,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// One product line of a sale
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineItemFields {
    #[serde(rename = "ItemNo")]
    pub item_no: FieldValue,
    #[serde(rename = "ProductDescription")]
    pub description: FieldValue,
    #[serde(rename = "Quantity")]
    pub quantity: FieldValue,
    #[serde(rename = "PriceOfSale")]
    pub price: FieldValue,
    #[serde(rename = "LinePrice")]
    pub line_price: FieldValue,
    #[serde(rename = "SerialNo")]
    pub serial_no: FieldValue,
    #[serde(rename = "UnitType")]
    pub unit_type: FieldValue,
    #[serde(rename = "SalesKeyProducts")]
    pub sales_key: FieldValue,
    #[serde(flatten)]
    pub extra: ExtraFields,
}
