//! Keyboard map inspection example for xkbwire
//!
//! Run with: cargo run --example inspect

use std::convert::Infallible;
use xkbwire::request::FromReply;
use xkbwire::*;

fn main() -> Result<()> {
    println!("xkbwire Keyboard Map Inspection");
    println!("================================");

    // Example 1: One key type record
    println!("\n1. Key Type Record:");
    {
        let entries = [types::KtMapEntry {
            active: true,
            mods_mask: types::ModMask::SHIFT,
            level: 1,
            mods_mods: types::ModMask::SHIFT,
            mods_vmods: 0,
        }];
        let preserve = [types::ModDef {
            mask: types::ModMask::SHIFT,
            real_mods: types::ModMask::SHIFT,
            vmods: 0,
        }];
        let spec = keytype::KeyTypeSpec {
            mods_mask: types::ModMask::SHIFT,
            mods_mods: types::ModMask::SHIFT,
            mods_vmods: 0,
            num_levels: 2, // base and shifted
            map: &entries,
            preserve: Some(&preserve),
        };

        let bytes = spec.serialize()?;
        println!("  Encoded {} bytes: {}", bytes.len(), hex(&bytes));

        let (view, used) = keytype::KeyType::unpack(&bytes)?;
        println!(
            "  Decoded: levels={}, map entries={}, preserve entries={}, used={}",
            view.num_levels,
            view.map().len(),
            view.preserve().len(),
            used
        );
    }

    // Example 2: Symbol map lookup
    println!("\n2. Symbol Map Lookup:");
    {
        let syms: [types::KeySym; 4] = [0x61, 0x41, 0x430, 0x410]; // a A cyrillic-a cyrillic-A
        let spec = symmap::KeySymMapSpec {
            kt_index: [1, 1, 0, 0],
            group_info: 2, // two groups
            width: 2,
            syms: &syms,
        };

        let bytes = spec.serialize()?;
        println!("  Encoded {} bytes", bytes.len());

        let (map, _) = symmap::KeySymMap::unpack(&bytes)?;
        for group in 0..map.num_groups() {
            for level in 0..map.width {
                if let Some(sym) = map.sym_at(group, level) {
                    println!("  group {} level {}: keysym 0x{:04x}", group, level, sym);
                }
            }
        }
    }

    // Example 3: Walking a map reply
    println!("\n3. Map Reply Walk:");
    {
        let entries = [types::KtMapEntry {
            active: true,
            mods_mask: types::ModMask::SHIFT,
            level: 1,
            mods_mods: types::ModMask::SHIFT,
            mods_vmods: 0,
        }];
        let ty = keytype::KeyTypeSpec {
            mods_mask: types::ModMask::SHIFT,
            mods_mods: types::ModMask::SHIFT,
            mods_vmods: 0,
            num_levels: 2,
            map: &entries,
            preserve: None,
        };
        let syms: [types::KeySym; 2] = [0x61, 0x41];
        let sym_map = symmap::KeySymMapSpec {
            kt_index: [0, 0, 0, 0],
            group_info: 1,
            width: 2,
            syms: &syms,
        };

        // A server would produce this buffer; here it is fabricated in place
        let ty_bytes = ty.serialize()?;
        let sym_bytes = sym_map.serialize()?;
        let body_len = ty_bytes.len() + sym_bytes.len();
        let header = map::MapHeader {
            response_type: 1,
            device_id: 3,
            length: ((map::MapHeader::SIZE - REPLY_BASE_SIZE + body_len) / 4) as u32,
            min_key_code: 8,
            max_key_code: 255,
            present: map::MapPart::KEY_TYPES | map::MapPart::KEY_SYMS,
            n_types: 1,
            total_types: 1,
            first_key_sym: 8,
            n_key_syms: 1,
            total_syms: 2,
            ..Default::default()
        };
        let mut buf = vec![0u8; map::MapHeader::SIZE + body_len];
        {
            let mut cur = WriteCursor::new(&mut buf[..map::MapHeader::SIZE]);
            header.emit(&mut cur)?;
        }
        buf[map::MapHeader::SIZE..map::MapHeader::SIZE + ty_bytes.len()]
            .copy_from_slice(&ty_bytes);
        buf[map::MapHeader::SIZE + ty_bytes.len()..].copy_from_slice(&sym_bytes);

        let reply = request::MapReply::from_reply(buf)?;
        println!(
            "  Device {}, keycodes {}..{}, present 0x{:04x}",
            reply.header().device_id,
            reply.header().min_key_code,
            reply.header().max_key_code,
            reply.header().present
        );

        let parts = reply.parts()?;
        for (ndx, ty) in parts.types().iter().enumerate() {
            println!(
                "  type {}: {} levels, {} map entries",
                ndx,
                ty.num_levels,
                ty.map().len()
            );
        }
        for (ndx, sm) in parts.syms().iter().enumerate() {
            println!(
                "  key {}: {} groups, syms {}",
                reply.header().first_key_sym as usize + ndx,
                sm.num_groups(),
                hex_syms(sm.syms())
            );
        }
    }

    // Example 4: Name list with masked atom runs
    println!("\n4. Name List:");
    {
        let spec = names::NameListSpec {
            keycodes_name: Some(100),
            types_name: Some(101),
            indicator_names: Some(names::MaskedNames {
                mask: 0b0101u32, // caps lock and scroll lock
                atoms: &[200, 201],
            }),
            group_names: Some(names::MaskedNames {
                mask: 0b01u8,
                atoms: &[300],
            }),
            ..Default::default()
        };

        let bytes = spec.serialize()?;
        let layout = spec.layout()?;
        let (list, used) = names::NameList::unpack(&bytes, &layout)?;
        println!("  Encoded {} bytes, which 0x{:08x}", used, list.which());
        println!("  Indicator 0x01 name atom: {:?}", list.indicator_name_for(0x01));
        println!("  Indicator 0x02 name atom: {:?}", list.indicator_name_for(0x02));
        println!("  Indicator 0x04 name atom: {:?}", list.indicator_name_for(0x04));
        println!("  Group 1 name atom: {:?}", list.group_name_for(0x01));
    }

    // Example 5: Request assembly and reply fetch
    println!("\n5. Request Assembly:");
    {
        let mut transport = DemoTransport { next: 1 };

        let args = request::SelectEventsArgs {
            device_spec: 0x0100, // core keyboard
            affect_which: events::EventType::BELL_NOTIFY | events::EventType::STATE_NOTIFY,
            clear: 0,
            select_all: 0,
            affect_map: 0,
            map: 0,
        };
        let details = events::EventDetails {
            state: events::Detail {
                affect: 0x01FF,
                details: 0x0081,
            },
            bell: events::Detail {
                affect: 0x01,
                details: 0x01,
            },
            ..Default::default()
        };
        let cookie =
            request::select_events(&mut transport, &args, &details).map_err(reply_err)?;
        println!("  select_events queued as handle {}", cookie.id());

        let cookie = request::get_indicator_state(&mut transport, 0x0100).map_err(reply_err)?;
        let state = cookie.fetch_reply(&mut transport).map_err(reply_err)?;
        println!("  indicator state: 0b{:b}", state.state);
    }

    // Example 6: Wire size overview
    println!("\n6. Wire Sizes:");
    {
        let two_level = keytype::KeyTypeSpec {
            mods_mask: types::ModMask::SHIFT,
            mods_mods: types::ModMask::SHIFT,
            mods_vmods: 0,
            num_levels: 2,
            map: &[],
            preserve: None,
        };
        let gated = events::EventDetails::gate(events::EventType::ALL, 0, 0);
        let sizes = [
            ("Key type, empty map", two_level.wire_len()?),
            ("Map reply fixed part", map::MapHeader::SIZE),
            ("Names reply fixed part", names::NamesHeader::SIZE),
            (
                "Event details, everything gated in",
                events::EventDetails::default().wire_len(gated),
            ),
        ];
        for (name, size) in sizes {
            println!("  {}: {} bytes", name, size);
        }
        println!("  Request padding unit: {} bytes", REQUEST_UNIT);
        println!("  Reply prologue: {} bytes", REPLY_BASE_SIZE);
    }

    println!("\nAll examples completed successfully!");
    Ok(())
}

struct DemoTransport {
    next: u64,
}

impl Transport for DemoTransport {
    type Error = Infallible;

    fn send_request(
        &mut self,
        info: &request::RequestInfo,
        body: &request::ScatterList,
    ) -> std::result::Result<u64, Infallible> {
        println!(
            "  -> opcode {}, {} bytes{}",
            info.opcode,
            body.total_len(),
            if info.is_void { ", void" } else { "" }
        );
        let handle = self.next;
        self.next += 1;
        Ok(handle)
    }

    fn wait_for_reply(&mut self, _handle: u64) -> std::result::Result<Vec<u8>, Infallible> {
        // Fabricated reply: caps lock lit
        let mut reply = vec![0u8; REPLY_BASE_SIZE];
        reply[0] = 1;
        reply[8..12].copy_from_slice(&0b10u32.to_ne_bytes());
        Ok(reply)
    }
}

fn reply_err(err: ReplyError<Infallible>) -> Error {
    match err {
        ReplyError::Wire(err) => err,
        ReplyError::Transport(never) => match never {},
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

fn hex_syms(syms: iter::FixedSlice<'_, types::KeySym>) -> String {
    syms.iter()
        .map(|s| format!("0x{:04x}", s))
        .collect::<Vec<_>>()
        .join(" ")
}
