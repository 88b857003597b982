//! Interoperability with the `rosc` implementation

use oscline_core::{time, OscAddress, OscBundle, OscColor, OscMessage, OscPacket, OscValue};
use rosc::{OscTime, OscType};

fn addr(s: &str) -> OscAddress {
    OscAddress::parse(s).unwrap()
}

#[test]
fn test_rosc_decodes_our_message() {
    let packet = OscPacket::from(
        OscMessage::new(addr("/synth/1/note"))
            .with_arg(60)
            .with_arg(0.75f32)
            .with_arg("legato")
            .with_arg(vec![1u8, 2, 3])
            .with_arg(-5i64)
            .with_arg(2.5f64)
            .with_arg(true)
            .with_arg(OscValue::Nil)
            .with_arg(OscValue::Infinitum)
            .with_arg('k')
            .with_arg(OscColor::new(10, 20, 30, 40)),
    );

    let bytes = packet.encode();
    let (rest, decoded) = rosc::decoder::decode_udp(&bytes).expect("rosc decode failed");
    assert!(rest.is_empty());

    match decoded {
        rosc::OscPacket::Message(msg) => {
            assert_eq!(msg.addr, "/synth/1/note");
            assert_eq!(
                msg.args,
                vec![
                    OscType::Int(60),
                    OscType::Float(0.75),
                    OscType::String("legato".to_string()),
                    OscType::Blob(vec![1, 2, 3]),
                    OscType::Long(-5),
                    OscType::Double(2.5),
                    OscType::Bool(true),
                    OscType::Nil,
                    OscType::Inf,
                    OscType::Char('k'),
                    OscType::Color(rosc::OscColor {
                        red: 10,
                        green: 20,
                        blue: 30,
                        alpha: 40,
                    }),
                ]
            );
        }
        _ => panic!("Expected Message"),
    }
}

#[test]
fn test_we_decode_rosc_bundle() {
    let bundle = rosc::OscPacket::Bundle(rosc::OscBundle {
        timetag: OscTime {
            seconds: 3_900_000_000,
            fractional: 12345,
        },
        content: vec![
            rosc::OscPacket::Message(rosc::OscMessage {
                addr: "/a".to_string(),
                args: vec![OscType::Float(1.0)],
            }),
            rosc::OscPacket::Message(rosc::OscMessage {
                addr: "/b".to_string(),
                args: vec![
                    OscType::String("hello".to_string()),
                    OscType::Time(OscTime {
                        seconds: 1,
                        fractional: 2,
                    }),
                ],
            }),
        ],
    });
    let bytes = rosc::encoder::encode(&bundle).expect("rosc encode failed");

    let expected = OscPacket::from(
        OscBundle::new(time::from_parts(3_900_000_000, 12345))
            .with_element(OscMessage::new(addr("/a")).with_arg(1.0f32))
            .with_element(
                OscMessage::new(addr("/b"))
                    .with_arg("hello")
                    .with_arg(OscValue::TimeTag(time::from_parts(1, 2))),
            ),
    );

    assert_eq!(OscPacket::decode(&bytes).expect("decode failed"), expected);
    // Byte-identical in the other direction too
    assert_eq!(&expected.encode()[..], &bytes[..]);
}

#[test]
fn test_false_and_empty_blob_match_rosc() {
    let ours = OscPacket::from(
        OscMessage::new(addr("/flags"))
            .with_arg(false)
            .with_arg(Vec::<u8>::new())
            .with_arg(""),
    );
    let theirs = rosc::OscPacket::Message(rosc::OscMessage {
        addr: "/flags".to_string(),
        args: vec![
            OscType::Bool(false),
            OscType::Blob(vec![]),
            OscType::String(String::new()),
        ],
    });

    assert_eq!(
        &ours.encode()[..],
        &rosc::encoder::encode(&theirs).unwrap()[..]
    );
}
