mod tests {
    use laserharp_core::ipc::{brightness_to_velocity, velocity_to_brightness};
    use laserharp_core::{
        AnimationId, Command, Error, FollowAction, IpcPacket, IpcRxQueue, PacketAssembler,
        UsbMidiPacket,
    };

    #[test]
    fn test_velocity_conversion() {
        assert_eq!(velocity_to_brightness(127), 63);
        assert_eq!(velocity_to_brightness(0), 0);
        assert_eq!(velocity_to_brightness(64), 31);
        assert_eq!(brightness_to_velocity(63), 127);
        assert_eq!(brightness_to_velocity(0), 0);
        // Truncation both ways, not an exact round trip
        assert_eq!(brightness_to_velocity(velocity_to_brightness(64)), 62);
    }

    #[test]
    fn test_parse_brightness_commands() {
        let packet = IpcPacket::new(0x80, 5, 100, 0);
        assert_eq!(
            Command::parse(&packet),
            Ok(Command::SetBrightness {
                index: 5,
                velocity: 100
            })
        );

        let packet = IpcPacket::new(0x81, 127, 0, 0);
        assert_eq!(
            Command::parse(&packet),
            Ok(Command::SetAllBrightness { velocity: 127 })
        );

        let packet = IpcPacket::new(0x82, 3, 0, 0);
        assert_eq!(
            Command::parse(&packet),
            Ok(Command::GetBrightness { index: 3 })
        );
    }

    #[test]
    fn test_parse_rejects_invalid_arguments() {
        assert_eq!(
            Command::parse(&IpcPacket::new(0x80, 24, 10, 0)),
            Err(Error::InvalidDiodeIndex { index: 24 })
        );
        assert_eq!(
            Command::parse(&IpcPacket::new(0x80, 1, 128, 0)),
            Err(Error::InvalidVelocity { velocity: 128 })
        );
        assert_eq!(
            Command::parse(&IpcPacket::new(0x81, 200, 0, 0)),
            Err(Error::InvalidVelocity { velocity: 200 })
        );
        assert_eq!(
            Command::parse(&IpcPacket::new(0x90, 0, 0, 0)),
            Err(Error::UnknownCommand { opcode: 0x90 })
        );
    }

    #[test]
    fn test_parse_animation_commands() {
        let packet = IpcPacket::new(0x83, 1, 25, 2);
        let Ok(Command::PlayAnimation {
            id,
            duration,
            follow_action,
        }) = Command::parse(&packet)
        else {
            panic!("expected play animation");
        };
        assert_eq!(id, 1);
        assert!((duration - 2.5).abs() < 1e-6);
        assert_eq!(follow_action, 2);

        assert_eq!(
            Command::parse(&IpcPacket::new(0x84, 0, 0, 0)),
            Ok(Command::StopAnimation)
        );
        assert_eq!(
            Command::play(AnimationId::Flip, 2.5, FollowAction::StopOff).to_packet(),
            packet
        );
    }

    #[test]
    fn test_parse_system_commands() {
        assert_eq!(
            Command::parse(&IpcPacket::new(0xF0, 0, 0, 0)),
            Ok(Command::Version)
        );
        assert_eq!(
            Command::parse(&IpcPacket::new(0xF1, 0, 0, 0)),
            Ok(Command::Reboot)
        );
    }

    #[test]
    fn test_parse_midi_forwarding() {
        let usb = IpcPacket::new(0x09, 0x90, 60, 100);
        assert_eq!(Command::parse(&usb), Ok(Command::UsbMidiOut(usb)));

        let din = IpcPacket::new(0x18, 0x80, 60, 0);
        assert_eq!(Command::parse(&din), Ok(Command::DinMidiOut(din)));
    }

    #[test]
    fn test_packet_assembler() {
        let mut assembler = PacketAssembler::new();
        let stream = [0x80, 1, 64, 0, 0xF0, 0];

        let packets: Vec<IpcPacket> = stream
            .iter()
            .filter_map(|byte| assembler.push(*byte))
            .collect();
        assert_eq!(packets, [IpcPacket::new(0x80, 1, 64, 0)]);
        assert_eq!(assembler.pending(), 2);

        assembler.reset();
        assert_eq!(assembler.pending(), 0);
        for byte in [0x84, 0, 0] {
            assert_eq!(assembler.push(byte), None);
        }
        assert_eq!(assembler.push(0), Some(IpcPacket::new(0x84, 0, 0, 0)));
    }

    #[test]
    fn test_usb_midi_forwarding_clears_cable_number() {
        let packet = UsbMidiPacket::from_bytes([0x39, 0x90, 60, 127]);
        assert_eq!(packet.cable_number(), 3);
        assert_eq!(packet.code_index(), 0x9);
        assert_eq!(packet.to_ipc_packet(), IpcPacket::new(0x09, 0x90, 60, 127));
    }

    #[test]
    fn test_rx_queue() {
        let queue = IpcRxQueue::new();
        let producer = queue.producer();
        let consumer = queue.consumer();

        for index in 0..32 {
            assert_eq!(producer.try_send(IpcPacket::new(0x82, index, 0, 0)), Ok(()));
        }
        assert_eq!(
            producer.try_send(IpcPacket::new(0x84, 0, 0, 0)),
            Err(Error::QueueFull)
        );
        assert_eq!(queue.len(), 32);

        assert_eq!(consumer.try_receive(), Some(IpcPacket::new(0x82, 0, 0, 0)));
        assert_eq!(consumer.drain().count(), 31);
        assert!(queue.is_empty());
        assert_eq!(consumer.try_receive(), None);
    }
}
