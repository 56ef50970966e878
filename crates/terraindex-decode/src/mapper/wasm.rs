//! Smart contract messages.

use base64::Engine;
use terraindex_core::{Account, Encoding, SubsetEvent};

use super::{account, coins, decode, event, transfer, MapContext, MsgKind, Registry};
use crate::error::MapError;
use crate::wire::msgs::{
    AminoMsgInstantiateContract, MsgExecuteContract, MsgMigrateContract, MsgStoreCode,
    MsgUpdateContractOwner, ProtoMsgInstantiateContract,
};
use crate::wire::Coin;

pub(super) fn register(registry: &mut Registry) {
    registry.register(MsgKind::WasmExecuteContract, execute_contract);
    registry.register(MsgKind::WasmStoreCode, store_code);
    registry.register(MsgKind::WasmUpdateContractOwner, update_contract_owner);
    registry.register(MsgKind::WasmInstantiateContract, instantiate_contract);
    registry.register(MsgKind::WasmMigrateContract, migrate_contract);
}

/// Contract messages are JSON documents carried as bytes.
fn json_text(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

fn contract(raw: &[u8], ctx: &MapContext<'_>) -> Result<String, MapError> {
    Ok(account(raw, ctx, "contract")?.id)
}

fn execute_contract(bytes: &[u8], ctx: &MapContext<'_>) -> Result<SubsetEvent, MapError> {
    let msg: MsgExecuteContract = decode(bytes, "MsgExecuteContract")?;
    let sender = account(&msg.sender, ctx, "sender")?;

    let mut se = event(MsgKind::WasmExecuteContract)
        .with_additional("contract", vec![contract(&msg.contract, ctx)?])
        .with_additional("execute_message", vec![json_text(&msg.execute_msg)]);
    se.sender.push(transfer(sender, coins(&msg.coins, "coins")?));
    Ok(se)
}

fn store_code(bytes: &[u8], ctx: &MapContext<'_>) -> Result<SubsetEvent, MapError> {
    let msg: MsgStoreCode = decode(bytes, "MsgStoreCode")?;
    let code = base64::engine::general_purpose::STANDARD.encode(&msg.wasm_byte_code);

    let mut se = event(MsgKind::WasmStoreCode).with_additional("wasm_byte_code", vec![code]);
    se.sender
        .push(transfer(account(&msg.sender, ctx, "sender")?, Vec::new()));
    Ok(se)
}

fn update_contract_owner(bytes: &[u8], ctx: &MapContext<'_>) -> Result<SubsetEvent, MapError> {
    let msg: MsgUpdateContractOwner = decode(bytes, "MsgUpdateContractOwner")?;
    Ok(event(MsgKind::WasmUpdateContractOwner)
        .with_additional("contract", vec![contract(&msg.contract, ctx)?])
        .with_node("new_owner", account(&msg.new_owner, ctx, "new_owner")?)
        .with_node("owner", account(&msg.owner, ctx, "owner")?))
}

/// Fields both instantiate encodings share.
struct Instantiate {
    owner: Account,
    admin: Option<Account>,
    migratable: bool,
    code_id: u64,
    init_msg: Vec<u8>,
    init_coins: Vec<Coin>,
}

fn instantiate_fields(bytes: &[u8], ctx: &MapContext<'_>) -> Result<Instantiate, MapError> {
    match ctx.encoding {
        Encoding::Amino => {
            let msg: AminoMsgInstantiateContract = decode(bytes, "MsgInstantiateContract")?;
            Ok(Instantiate {
                owner: account(&msg.owner, ctx, "owner")?,
                admin: None,
                migratable: msg.migratable,
                code_id: msg.code_id,
                init_msg: msg.init_msg,
                init_coins: msg.init_coins,
            })
        }
        Encoding::Proto => {
            let msg: ProtoMsgInstantiateContract = decode(bytes, "MsgInstantiateContract")?;
            let admin = if msg.admin.is_empty() {
                None
            } else {
                Some(account(&msg.admin, ctx, "admin")?)
            };
            Ok(Instantiate {
                owner: account(&msg.sender, ctx, "sender")?,
                migratable: admin.is_some(),
                admin,
                code_id: msg.code_id,
                init_msg: msg.init_msg,
                init_coins: msg.init_coins,
            })
        }
    }
}

fn instantiate_contract(bytes: &[u8], ctx: &MapContext<'_>) -> Result<SubsetEvent, MapError> {
    let fields = instantiate_fields(bytes, ctx)?;

    let mut se = event(MsgKind::WasmInstantiateContract)
        .with_additional("migratable", vec![fields.migratable.to_string()])
        .with_additional("code_id", vec![fields.code_id.to_string()])
        .with_additional("init_msg", vec![json_text(&fields.init_msg)])
        .with_node("owner", fields.owner);
    if let Some(admin) = fields.admin {
        se = se.with_node("admin", admin);
    }
    for (i, amount) in coins(&fields.init_coins, "init_coins")?.into_iter().enumerate() {
        se.amount.insert(format!("init_coin_{i}"), amount);
    }
    Ok(se)
}

fn migrate_contract(bytes: &[u8], ctx: &MapContext<'_>) -> Result<SubsetEvent, MapError> {
    let msg: MsgMigrateContract = decode(bytes, "MsgMigrateContract")?;
    Ok(event(MsgKind::WasmMigrateContract)
        .with_additional("contract", vec![contract(&msg.contract, ctx)?])
        .with_additional("new_code_id", vec![msg.new_code_id.to_string()])
        .with_additional("migrate_msg", vec![json_text(&msg.migrate_msg)])
        .with_node("owner", account(&msg.owner, ctx, "owner")?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::testing::*;

    #[test]
    fn execute_contract_sender_and_message() {
        let msg = MsgExecuteContract {
            sender: FROM.to_vec(),
            contract: TO.to_vec(),
            execute_msg: br#"{"swap":{}}"#.to_vec(),
            coins: vec![Coin::new("uusd", "250")],
        };
        let se = map_amino(MsgKind::WasmExecuteContract, &msg).unwrap();
        assert_eq!(se.sender[0].account.id, bech(&FROM, "terra"));
        assert_eq!(se.sender[0].amounts[0].text, "250");
        assert_eq!(se.additional["contract"], vec![bech(&TO, "terra")]);
        assert_eq!(se.additional["execute_message"], vec![r#"{"swap":{}}"#]);
    }

    #[test]
    fn store_code_is_base64() {
        let msg = MsgStoreCode {
            sender: b"terra1s".to_vec(),
            wasm_byte_code: vec![0, 97, 115, 109],
        };
        let se = map_proto(MsgKind::WasmStoreCode, &msg).unwrap();
        assert_eq!(se.additional["wasm_byte_code"], vec!["AGFzbQ=="]);
        assert!(se.sender[0].amounts.is_empty());
    }

    #[test]
    fn amino_instantiate() {
        let msg = AminoMsgInstantiateContract {
            owner: FROM.to_vec(),
            code_id: 12,
            init_msg: b"{}".to_vec(),
            init_coins: vec![Coin::new("uluna", "1"), Coin::new("uusd", "2")],
            migratable: true,
        };
        let se = map_amino(MsgKind::WasmInstantiateContract, &msg).unwrap();
        assert_eq!(se.additional["migratable"], vec!["true"]);
        assert_eq!(se.additional["code_id"], vec!["12"]);
        assert_eq!(se.amount["init_coin_0"].currency, "uluna");
        assert_eq!(se.amount["init_coin_1"].currency, "uusd");
        assert!(!se.node.contains_key("admin"));
    }

    #[test]
    fn proto_instantiate_admin_means_migratable() {
        let msg = ProtoMsgInstantiateContract {
            sender: b"terra1sender".to_vec(),
            admin: b"terra1admin".to_vec(),
            code_id: 3,
            init_msg: b"{}".to_vec(),
            init_coins: vec![],
        };
        let se = map_proto(MsgKind::WasmInstantiateContract, &msg).unwrap();
        assert_eq!(se.node["owner"][0].id, "terra1sender");
        assert_eq!(se.node["admin"][0].id, "terra1admin");
        assert_eq!(se.additional["migratable"], vec!["true"]);
    }

    #[test]
    fn migrate_and_update_owner() {
        let migrate = MsgMigrateContract {
            owner: b"terra1o".to_vec(),
            contract: b"terra1c".to_vec(),
            new_code_id: 9,
            migrate_msg: b"{\"v\":2}".to_vec(),
        };
        let se = map_proto(MsgKind::WasmMigrateContract, &migrate).unwrap();
        assert_eq!(se.additional["new_code_id"], vec!["9"]);
        assert_eq!(se.additional["migrate_msg"], vec!["{\"v\":2}"]);

        let update = MsgUpdateContractOwner {
            owner: b"terra1o".to_vec(),
            new_owner: b"terra1n".to_vec(),
            contract: b"terra1c".to_vec(),
        };
        let se = map_proto(MsgKind::WasmUpdateContractOwner, &update).unwrap();
        assert_eq!(se.node["new_owner"][0].id, "terra1n");
        assert_eq!(se.additional["contract"], vec!["terra1c"]);
    }
}
