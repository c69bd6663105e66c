//! Document fixtures shared by the offset tests.

use serde_json::{Value, json};

/// A minimal but complete document triple
pub(crate) fn sample_documents() -> (Value, Value, Value) {
    let offsets = json!({
        "client.dll": {
            "dwEntityList": 0x1A1F730,
            "dwLocalPlayerPawn": 0x1874040,
            "dwLocalPlayerController": 0x1A6ED90,
            "dwViewMatrix": 0x1A89130,
            "dwGlobalVars": 0x186CD50
        },
        "engine2.dll": {"dwBuildNumber": 0x52E754}
    });
    let client_dll = json!({
        "client.dll": {
            "classes": {
                "CEntityInstance": {"fields": {"m_pEntity": 16}, "parent": null},
                "C_BaseEntity": {
                    "fields": {"m_iHealth": 836, "m_iTeamNum": 995, "m_pGameSceneNode": 808},
                    "parent": "CEntityInstance"
                },
                "C_BaseModelEntity": {"fields": {}, "parent": "C_BaseEntity"},
                "C_BasePlayerPawn": {
                    "fields": {"m_vOldOrigin": 4900, "m_pWeaponServices": 4352},
                    "parent": "C_BaseModelEntity"
                },
                "C_CSPlayerPawnBase": {
                    "fields": {"m_flFlashDuration": 5292, "m_iIDEntIndex": 5208},
                    "parent": "C_BasePlayerPawn"
                },
                "C_CSPlayerPawn": {
                    "fields": {"m_pClippingWeapon": 5040},
                    "parent": "C_CSPlayerPawnBase"
                },
                "CGameSceneNode": {
                    "fields": {"m_vecAbsOrigin": 208, "m_bDormant": 239},
                    "parent": null
                },
                "CBasePlayerController": {"fields": {"m_iszPlayerName": 1640}},
                "CCSPlayerController": {
                    "fields": {"m_hPlayerPawn": 2060},
                    "parent": "CBasePlayerController"
                },
                "CPlayer_WeaponServices": {"fields": {"m_hActiveWeapon": 88}},
                "C_EconEntity": {
                    "fields": {"m_AttributeManager": 4400},
                    "parent": "C_BaseModelEntity"
                },
                "C_AttributeContainer": {"fields": {"m_Item": 80}},
                "C_EconItemView": {"fields": {"m_iItemDefinitionIndex": 442}}
            }
        }
    });
    let buttons = json!({"client.dll": {"attack": 0x1868B30, "jump": 0x1869040}});
    (offsets, client_dll, buttons)
}
