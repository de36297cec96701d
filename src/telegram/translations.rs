/// Fixed caption strings for one language
#[derive(Debug, PartialEq, Eq)]
pub struct Translations {
    pub language: &'static str,
    pub travel_details: &'static str,
    pub from: &'static str,
    pub to: &'static str,
    pub dates: &'static str,
    pub price: &'static str,
    pub flight: &'static str,
    pub book_flight: &'static str,
    pub hotel_options: &'static str,
    pub book_hotel: &'static str,
    pub no_hotels: &'static str,
}

const ENGLISH: Translations = Translations {
    language: "English",
    travel_details: "Travel Details",
    from: "From",
    to: "To",
    dates: "Dates",
    price: "Price",
    flight: "Flight",
    book_flight: "Book Flight",
    hotel_options: "Hotel Options",
    book_hotel: "Book Hotel",
    no_hotels: "No hotel offers found.",
};

const SPANISH: Translations = Translations {
    language: "Spanish",
    travel_details: "Detalles del viaje",
    from: "Desde",
    to: "Hasta",
    dates: "Fechas",
    price: "Precio",
    flight: "Vuelo",
    book_flight: "Reservar vuelo",
    hotel_options: "Opciones de hotel",
    book_hotel: "Reservar hotel",
    no_hotels: "No se encontraron ofertas de hotel.",
};

const RUSSIAN: Translations = Translations {
    language: "Russian",
    travel_details: "Детали поездки",
    from: "Откуда",
    to: "Куда",
    dates: "Даты",
    price: "Цена",
    flight: "Рейс",
    book_flight: "Забронировать рейс",
    hotel_options: "Варианты отелей",
    book_hotel: "Забронировать отель",
    no_hotels: "Предложения отелей не найдены.",
};

const GERMAN: Translations = Translations {
    language: "German",
    travel_details: "Reisedetails",
    from: "Von",
    to: "Nach",
    dates: "Daten",
    price: "Preis",
    flight: "Flug",
    book_flight: "Flug buchen",
    hotel_options: "Hotelangebote",
    book_hotel: "Hotel buchen",
    no_hotels: "Keine Hotelangebote gefunden.",
};

const FRENCH: Translations = Translations {
    language: "French",
    travel_details: "Détails du voyage",
    from: "Départ",
    to: "Destination",
    dates: "Dates",
    price: "Prix",
    flight: "Vol",
    book_flight: "Réserver le vol",
    hotel_options: "Options d'hôtel",
    book_hotel: "Réserver l'hôtel",
    no_hotels: "Aucune offre d'hôtel trouvée.",
};

const ITALIAN: Translations = Translations {
    language: "Italian",
    travel_details: "Dettagli del viaggio",
    from: "Da",
    to: "A",
    dates: "Date",
    price: "Prezzo",
    flight: "Volo",
    book_flight: "Prenota il volo",
    hotel_options: "Opzioni di hotel",
    book_hotel: "Prenota l'hotel",
    no_hotels: "Nessuna offerta di hotel trovata.",
};

const PORTUGUESE: Translations = Translations {
    language: "Portuguese",
    travel_details: "Detalhes da viagem",
    from: "De",
    to: "Para",
    dates: "Datas",
    price: "Preço",
    flight: "Voo",
    book_flight: "Reservar voo",
    hotel_options: "Opções de hotel",
    book_hotel: "Reservar hotel",
    no_hotels: "Nenhuma oferta de hotel encontrada.",
};

const ALL: [&Translations; 7] = [
    &ENGLISH,
    &SPANISH,
    &RUSSIAN,
    &GERMAN,
    &FRENCH,
    &ITALIAN,
    &PORTUGUESE,
];

impl Translations {
    /// Look up by full language name, case-insensitively. Unknown languages get English.
    pub fn for_language(language: &str) -> &'static Translations {
        let wanted = language.trim();
        ALL.into_iter()
            .find(|t| t.language.eq_ignore_ascii_case(wanted))
            .unwrap_or(&ENGLISH)
    }
}
